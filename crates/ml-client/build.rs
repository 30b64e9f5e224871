fn main() {
    // The scorer service is described in Rust rather than a .proto file,
    // so building the client does not need protoc on the machine.
    let predict = tonic_build::manual::Method::builder()
        .name("predict")
        .route_name("Predict")
        .input_type("crate::rating::PredictRequest")
        .output_type("crate::rating::PredictResponse")
        .codec_path("tonic::codec::ProstCodec")
        .build();

    let scorer = tonic_build::manual::Service::builder()
        .name("RatingScorer")
        .package("rating")
        .method(predict)
        .build();

    tonic_build::manual::Builder::new().compile(&[scorer]);
    println!("cargo:rerun-if-changed=build.rs");
}
