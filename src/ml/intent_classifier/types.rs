//! Common types for intent classification.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

/// Training sample for intent classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSample {
    /// Normalized pattern text.
    pub text: String,
    /// Intent tag.
    pub tag: String,
}

impl IntentSample {
    pub fn new<T: Into<String>, L: Into<String>>(text: T, tag: L) -> Self {
        IntentSample {
            text: text.into(),
            tag: tag.into(),
        }
    }
}

/// Probability assigned to one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagProbability {
    pub tag: String,
    pub probability: f64,
}

/// Wall-clock budget shared by every fitting step of one training run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    /// A deadline `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Fail with [`TrainingError::Timeout`] once the budget is spent.
    pub fn check(&self) -> std::result::Result<(), TrainingError> {
        let elapsed = self.started.elapsed();
        if elapsed > self.limit {
            return Err(TrainingError::Timeout {
                elapsed,
                limit: self.limit,
            });
        }
        Ok(())
    }
}
