//! Cosine similarity helpers for vector ranking.
//!
//! A missing embedding is an explicit `None`, never a zero vector: a zero
//! vector has no direction, so it gets `None` as well and ranks after every
//! record with a usable embedding.

use crate::models::Vector;

/// Cosine similarity of two equal-length, non-zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let sim = dot / (norm_a * norm_b);
    if sim.is_nan() {
        None
    } else {
        Some(sim.clamp(-1.0, 1.0))
    }
}

/// Cosine distance (`1 − similarity`, in `[0, 2]`) between a query and a
/// record embedding. `None` when the record has no usable embedding.
pub fn cosine_distance(query: &Vector, embedding: Option<&Vector>) -> Option<f32> {
    let embedding = embedding?;
    cosine_similarity(query.as_slice(), embedding.as_slice()).map(|sim| 1.0 - sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_distance_zero() {
        let q = Vector::from(vec![0.3, 0.4, 0.5]);
        let d = cosine_distance(&q, Some(&q)).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_distance_one() {
        let q = Vector::from(vec![1.0, 0.0]);
        let e = Vector::from(vec![0.0, 1.0]);
        assert!((cosine_distance(&q, Some(&e)).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors_distance_two() {
        let q = Vector::from(vec![1.0, 2.0]);
        let e = Vector::from(vec![-1.0, -2.0]);
        assert!((cosine_distance(&q, Some(&e)).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_does_not_matter() {
        let q = Vector::from(vec![1.0, 1.0]);
        let e = Vector::from(vec![10.0, 10.0]);
        assert!(cosine_distance(&q, Some(&e)).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_missing_embedding_is_none() {
        let q = Vector::from(vec![1.0, 0.0]);
        assert_eq!(cosine_distance(&q, None), None);
    }

    #[test]
    fn test_zero_vector_is_none_not_distance() {
        let q = Vector::from(vec![1.0, 0.0]);
        let zero = Vector::from(vec![0.0, 0.0]);
        assert_eq!(cosine_distance(&q, Some(&zero)), None);
        assert_eq!(cosine_distance(&zero, Some(&q)), None);
    }

    #[test]
    fn test_dimension_mismatch_is_none() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
    }
}
