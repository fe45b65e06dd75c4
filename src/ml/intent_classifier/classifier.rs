//! Intent classifier trait definition.

use crate::error::{Result, TrainingError};

use super::types::TagProbability;

/// A multi-class classifier over feature vectors.
///
/// Implementations provide a full posterior distribution over the tags they
/// were fitted on; the prediction is its arg max.
pub trait IntentClassifier: Send + Sync {
    /// Tags known to the classifier, in index order.
    fn labels(&self) -> &[String];

    /// Probability of every known tag, in [`labels`](Self::labels) order.
    ///
    /// The probabilities sum to 1.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<TagProbability>>;

    /// The most probable tag and its probability.
    ///
    /// Ties go to the tag seen first during fitting.
    fn predict(&self, features: &[f64]) -> Result<TagProbability> {
        let mut best: Option<TagProbability> = None;
        for candidate in self.predict_proba(features)? {
            match &best {
                Some(current) if current.probability >= candidate.probability => {}
                _ => best = Some(candidate),
            }
        }
        best.ok_or_else(|| TrainingError::Fit("classifier has no labels".to_string()).into())
    }

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
