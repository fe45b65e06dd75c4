//! Multinomial logistic regression.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::{CofibotError, Result, TrainingError};

use super::classifier::IntentClassifier;
use super::types::{Deadline, TagProbability};

/// Softmax regression fitted by full-batch gradient descent.
///
/// Weights start at zero and the data is visited in a fixed order, so fitting
/// the same examples twice yields the same model. The objective is the mean
/// cross-entropy plus `0.5 * l2_strength / n * ||W||²`; biases are not
/// penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Tags in first-seen order.
    labels: Vec<String>,
    n_features: usize,
    /// Row-major `labels.len() x n_features` matrix.
    weights: Vec<f64>,
    bias: Vec<f64>,
    /// Gradient steps taken during fitting.
    iterations: usize,
}

impl LogisticRegression {
    /// Fit on feature vectors and their tags.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[String],
        config: &ClassifierConfig,
        deadline: Option<&Deadline>,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(TrainingError::EmptyCorpus.into());
        }
        if features.len() != labels.len() {
            return Err(TrainingError::Fit(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            ))
            .into());
        }

        let n_features = features[0].len();
        if features.iter().any(|row| row.len() != n_features) {
            return Err(TrainingError::Fit("feature vectors differ in length".to_string()).into());
        }

        let mut classes: Vec<String> = Vec::new();
        let mut class_index: HashMap<&str, usize> = HashMap::new();
        let targets: Vec<usize> = labels
            .iter()
            .map(|label| {
                *class_index.entry(label.as_str()).or_insert_with(|| {
                    classes.push(label.clone());
                    classes.len() - 1
                })
            })
            .collect();

        if classes.len() < 2 {
            return Err(TrainingError::TooFewTags {
                actual: classes.len(),
            }
            .into());
        }

        let mut model = LogisticRegression {
            weights: vec![0.0; classes.len() * n_features],
            bias: vec![0.0; classes.len()],
            labels: classes,
            n_features,
            iterations: 0,
        };
        model.descend(features, &targets, config, deadline)?;
        Ok(model)
    }

    fn descend(
        &mut self,
        features: &[Vec<f64>],
        targets: &[usize],
        config: &ClassifierConfig,
        deadline: Option<&Deadline>,
    ) -> Result<()> {
        let n_samples = features.len() as f64;
        let n_classes = self.labels.len();
        let penalty = config.l2_strength / n_samples;
        let mut previous_loss = f64::INFINITY;

        for iteration in 0..config.max_iterations {
            if let Some(deadline) = deadline {
                deadline.check()?;
            }

            let probabilities: Vec<Vec<f64>> = features
                .par_iter()
                .map(|row| self.posterior(row))
                .collect();

            let mut loss = 0.0;
            let mut grad_weights = vec![0.0; self.weights.len()];
            let mut grad_bias = vec![0.0; n_classes];
            for ((row, probs), &target) in features.iter().zip(&probabilities).zip(targets) {
                loss -= probs[target].max(f64::MIN_POSITIVE).ln();
                for (class, &p) in probs.iter().enumerate() {
                    let error = p - if class == target { 1.0 } else { 0.0 };
                    grad_bias[class] += error;
                    let grad_row =
                        &mut grad_weights[class * self.n_features..(class + 1) * self.n_features];
                    for (g, &x) in grad_row.iter_mut().zip(row) {
                        if x != 0.0 {
                            *g += error * x;
                        }
                    }
                }
            }

            let squared_norm: f64 = self.weights.iter().map(|w| w * w).sum();
            loss = loss / n_samples + 0.5 * penalty * squared_norm;
            if !loss.is_finite() {
                return Err(TrainingError::Fit(format!("loss diverged at iteration {iteration}")).into());
            }
            if previous_loss - loss < config.tolerance {
                break;
            }
            previous_loss = loss;

            for (w, g) in self.weights.iter_mut().zip(&grad_weights) {
                *w -= config.learning_rate * (g / n_samples + penalty * *w);
            }
            for (b, g) in self.bias.iter_mut().zip(&grad_bias) {
                *b -= config.learning_rate * g / n_samples;
            }
            self.iterations = iteration + 1;
        }

        Ok(())
    }

    /// Max-shifted softmax of the class scores.
    fn posterior(&self, features: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .weights
            .chunks(self.n_features.max(1))
            .zip(&self.bias)
            .map(|(row, b)| {
                row.iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + b
            })
            .collect();

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl IntentClassifier for LogisticRegression {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<TagProbability>> {
        if features.len() != self.n_features {
            return Err(CofibotError::validation(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        Ok(self
            .labels
            .iter()
            .zip(self.posterior(features))
            .map(|(tag, probability)| TagProbability {
                tag: tag.clone(),
                probability,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}
