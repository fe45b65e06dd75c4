//! Train / held-out splitting of intent samples.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::ml::intent_classifier::IntentSample;

/// Minimum number of samples a tag needs for a stratified split.
pub const MIN_SAMPLES_PER_TAG: usize = 2;

/// How the held-out set was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStrategy {
    /// Every tag contributes to both sides in proportion.
    Stratified,
    /// Samples are held out without regard to their tag.
    Random,
    /// No held-out set: the model is evaluated on its own training data.
    Resubstitution,
}

impl std::fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SplitStrategy::Stratified => "stratified",
            SplitStrategy::Random => "random",
            SplitStrategy::Resubstitution => "resubstitution",
        };
        f.write_str(name)
    }
}

/// The two sides of a split. Both keep the original sample order.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<IntentSample>,
    pub held_out: Vec<IntentSample>,
    pub strategy: SplitStrategy,
}

impl TrainTestSplit {
    /// Train and evaluate on the same samples.
    pub fn resubstitution(samples: &[IntentSample]) -> Self {
        TrainTestSplit {
            train: samples.to_vec(),
            held_out: samples.to_vec(),
            strategy: SplitStrategy::Resubstitution,
        }
    }

    /// Number of distinct tags on the training side.
    pub fn train_tag_count(&self) -> usize {
        let mut tags: Vec<&str> = self.train.iter().map(|s| s.tag.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        tags.len()
    }
}

/// Hold out `round(n * test_ratio)` samples of each tag, at least one and at
/// most `n - 1`.
///
/// Fails with [`TrainingError::InsufficientData`] naming the first tag that
/// has fewer than [`MIN_SAMPLES_PER_TAG`] samples.
pub fn stratified_split<R: Rng + ?Sized>(
    samples: &[IntentSample],
    test_ratio: f64,
    rng: &mut R,
) -> Result<TrainTestSplit, TrainingError> {
    if samples.is_empty() {
        return Err(TrainingError::EmptyCorpus);
    }

    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for (idx, sample) in samples.iter().enumerate() {
        let group = *group_index.entry(sample.tag.as_str()).or_insert_with(|| {
            groups.push((sample.tag.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[group].1.push(idx);
    }

    if let Some((tag, members)) = groups
        .iter()
        .find(|(_, members)| members.len() < MIN_SAMPLES_PER_TAG)
    {
        return Err(TrainingError::InsufficientData {
            tag: tag.to_string(),
            min_per_class: MIN_SAMPLES_PER_TAG,
            actual: members.len(),
        });
    }

    let mut held = vec![false; samples.len()];
    for (_, members) in &mut groups {
        members.shuffle(&mut *rng);
        for &idx in &members[..held_out_count(members.len(), test_ratio)] {
            held[idx] = true;
        }
    }

    Ok(partition(samples, &held, SplitStrategy::Stratified))
}

/// Hold out `round(n * test_ratio)` samples regardless of tag, at least one
/// and at most `n - 1`. With fewer than two samples nothing is held out.
pub fn random_split<R: Rng + ?Sized>(
    samples: &[IntentSample],
    test_ratio: f64,
    rng: &mut R,
) -> TrainTestSplit {
    let mut held = vec![false; samples.len()];
    if samples.len() >= 2 {
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.shuffle(&mut *rng);
        for &idx in &order[..held_out_count(samples.len(), test_ratio)] {
            held[idx] = true;
        }
    }
    partition(samples, &held, SplitStrategy::Random)
}

fn held_out_count(n: usize, test_ratio: f64) -> usize {
    ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1)
}

fn partition(samples: &[IntentSample], held: &[bool], strategy: SplitStrategy) -> TrainTestSplit {
    let (held_out, train): (Vec<_>, Vec<_>) = samples
        .iter()
        .zip(held)
        .partition(|(_, is_held)| **is_held);
    TrainTestSplit {
        train: train.into_iter().map(|(s, _)| s.clone()).collect(),
        held_out: held_out.into_iter().map(|(s, _)| s.clone()).collect(),
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn samples(counts: &[(&str, usize)]) -> Vec<IntentSample> {
        counts
            .iter()
            .flat_map(|&(tag, count)| {
                (0..count).map(move |i| IntentSample::new(format!("{tag} {i}"), tag))
            })
            .collect()
    }

    fn count(samples: &[IntentSample], tag: &str) -> usize {
        samples.iter().filter(|s| s.tag == tag).count()
    }

    #[test]
    fn test_stratified_split_per_tag() {
        let data = samples(&[("a", 10), ("b", 5), ("c", 2)]);
        let mut rng = StdRng::seed_from_u64(42);
        let split = stratified_split(&data, 0.2, &mut rng).unwrap();

        assert_eq!(split.strategy, SplitStrategy::Stratified);
        assert_eq!(count(&split.held_out, "a"), 2);
        assert_eq!(count(&split.held_out, "b"), 1);
        assert_eq!(count(&split.held_out, "c"), 1);
        assert_eq!(split.train.len() + split.held_out.len(), data.len());
        assert_eq!(split.train_tag_count(), 3);
    }

    #[test]
    fn test_stratified_split_is_seeded() {
        let data = samples(&[("a", 10), ("b", 10)]);
        let a = stratified_split(&data, 0.2, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = stratified_split(&data, 0.2, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.held_out, b.held_out);
        assert_eq!(a.train, b.train);
    }

    #[test]
    fn test_stratified_split_insufficient_data() {
        let data = samples(&[("a", 3), ("b", 1)]);
        let err = stratified_split(&data, 0.2, &mut StdRng::seed_from_u64(42)).unwrap_err();
        assert_eq!(
            err,
            TrainingError::InsufficientData {
                tag: "b".to_string(),
                min_per_class: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_random_split_bounds() {
        let data = samples(&[("a", 3), ("b", 1)]);
        let split = random_split(&data, 0.2, &mut StdRng::seed_from_u64(42));
        assert_eq!(split.strategy, SplitStrategy::Random);
        assert_eq!(split.held_out.len(), 1);
        assert_eq!(split.train.len(), 3);

        let single = samples(&[("a", 1)]);
        let split = random_split(&single, 0.2, &mut StdRng::seed_from_u64(42));
        assert!(split.held_out.is_empty());
        assert_eq!(split.train.len(), 1);
    }

    #[test]
    fn test_resubstitution() {
        let data = samples(&[("a", 1), ("b", 1)]);
        let split = TrainTestSplit::resubstitution(&data);
        assert_eq!(split.train, data);
        assert_eq!(split.held_out, data);
        assert_eq!(split.strategy.to_string(), "resubstitution");
    }
}
