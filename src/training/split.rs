//! Stratified train/test splitting

use crate::error::{PlacementError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of a train/test split, each list in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Count rows per class label
pub fn class_counts(y: &Array1<f64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label.round() as i64).or_insert(0) += 1;
    }
    counts
}

/// Split rows so each class keeps its proportion in both parts.
///
/// Each class contributes `round(n_class * test_size)` rows to the test part,
/// clamped so both parts receive at least one row of every class.
pub fn stratified_split(y: &Array1<f64>, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PlacementError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in y.iter().enumerate() {
        class_indices.entry(label.round() as i64).or_default().push(idx);
    }

    if class_indices.len() < 2 {
        return Err(PlacementError::InsufficientClasses(format!(
            "found {} distinct label value(s), need at least 2",
            class_indices.len()
        )));
    }

    if let Some((label, indices)) = class_indices.iter().find(|(_, idx)| idx.len() < 2) {
        return Err(PlacementError::InsufficientClasses(format!(
            "class {} has {} row(s), need at least 2 to stratify",
            label,
            indices.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for indices in class_indices.values_mut() {
        indices.shuffle(&mut rng);
        let n = indices.len();
        let n_test = ((n as f64) * test_size).round() as usize;
        let n_test = n_test.clamp(1, n - 1);
        test_indices.extend_from_slice(&indices[..n_test]);
        train_indices.extend_from_slice(&indices[n_test..]);
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_pos: usize, n_neg: usize) -> Array1<f64> {
        Array1::from_iter(
            std::iter::repeat(1.0)
                .take(n_pos)
                .chain(std::iter::repeat(0.0).take(n_neg)),
        )
    }

    #[test]
    fn test_proportions_preserved() {
        let y = labels(70, 30);
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.test_indices.len(), 20);
        assert_eq!(split.train_indices.len(), 80);

        let test_pos = split.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
        assert_eq!(test_pos, 14);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let y = labels(13, 8);
        let split = stratified_split(&y, 0.25, 7).unwrap();

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..21).collect::<Vec<_>>());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let y = labels(40, 25);
        let a = stratified_split(&y, 0.2, 42).unwrap();
        let b = stratified_split(&y, 0.2, 42).unwrap();
        let c = stratified_split(&y, 0.2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_single_class_fails() {
        let y = labels(10, 0);
        assert!(matches!(
            stratified_split(&y, 0.2, 42),
            Err(PlacementError::InsufficientClasses(_))
        ));
    }

    #[test]
    fn test_singleton_class_fails() {
        let y = labels(10, 1);
        assert!(matches!(
            stratified_split(&y, 0.2, 42),
            Err(PlacementError::InsufficientClasses(_))
        ));
    }

    #[test]
    fn test_class_counts() {
        let counts = class_counts(&labels(3, 2));
        assert_eq!(counts.get(&1), Some(&3));
        assert_eq!(counts.get(&0), Some(&2));
    }
}
