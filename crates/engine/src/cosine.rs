//! Cosine similarity over tag vectors.
//!
//! cos(a, b) = (a · b) / (||a|| x ||b||)
//!
//! A zero-norm vector has no direction, so its similarity to anything
//! (itself included) is 0.0. Results are clamped to [-1, 1] and are never NaN.
//!
//! Norms and dot products accumulate in f64 and only the final score is
//! rounded to f32, so pairs whose exact similarities are equal get equal
//! scores and the ranking falls back to catalog order for them.

/// L2 norm in f64, computed the same way `FeatureMatrix` computes its row norms
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

/// Cosine similarity reusing precomputed norms.
pub fn cosine_with_norms(a: &[f32], norm_a: f64, b: &[f32], norm_b: f64) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}
