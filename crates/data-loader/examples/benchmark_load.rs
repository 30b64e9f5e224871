use data_loader::{ArtifactPaths, DataIndex};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("artifacts");

    println!("Loading rating artifacts...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(data_dir, &ArtifactPaths::default())
        .expect("Failed to load artifacts");
    let elapsed = start.elapsed();

    let values = index.len() * index.feature_width();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", index.len());
    println!("Feature width: {}", index.feature_width());
    println!("\nPerformance: {:.0} values/second",
             values as f64 / elapsed.as_secs_f64());
}
