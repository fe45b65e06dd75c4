//! Error types for the CofiBot engine.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! the [`CofibotError`] enum. Nothing in the engine panics or aborts the process
//! on bad input: callers (typically an HTTP layer) inspect the variant, or one of
//! the `is_*` helpers, and decide how to surface it.
//!
//! # Examples
//!
//! ```
//! use cofibot::error::{CofibotError, Result};
//!
//! fn lookup(tag: &str) -> Result<()> {
//!     Err(CofibotError::not_found(tag))
//! }
//!
//! let err = lookup("greeting").unwrap_err();
//! assert!(err.is_not_found());
//! assert_eq!(err.to_string(), "Intent not found: greeting");
//! ```

use std::io;
use std::time::Duration;

use thiserror::Error;

/// The main error type for CofiBot operations.
#[derive(Error, Debug)]
pub enum CofibotError {
    /// I/O errors from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed or missing intent data.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An intent with this tag already exists.
    #[error("Intent already exists: {0}")]
    DuplicateTag(String),

    /// No intent with this tag exists.
    #[error("Intent not found: {0}")]
    NotFound(String),

    /// Corpus or artifact read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Binary model artifact could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Fitting the extractor or classifier failed.
    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    /// Inference was requested before any model was loaded.
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// The input text was empty after normalization.
    #[error("Empty input")]
    EmptyInput,

    /// Configuration values are out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while fitting a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    #[error("Training data insufficient: tag '{tag}' needs at least {min_per_class} examples, got {actual}")]
    InsufficientData {
        tag: String,
        min_per_class: usize,
        actual: usize,
    },

    #[error("At least 2 distinct tags are required, got {actual}")]
    TooFewTags { actual: usize },

    #[error("No training examples")]
    EmptyCorpus,

    #[error("Training exceeded its time limit of {limit:?} (ran for {elapsed:?})")]
    Timeout { elapsed: Duration, limit: Duration },

    #[error("Fitting failed: {0}")]
    Fit(String),
}

/// Result type alias for operations that may fail with CofibotError.
pub type Result<T> = std::result::Result<T, CofibotError>;

impl CofibotError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        CofibotError::Validation(msg.into())
    }

    /// Create a new duplicate tag error.
    pub fn duplicate_tag<S: Into<String>>(tag: S) -> Self {
        CofibotError::DuplicateTag(tag.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(tag: S) -> Self {
        CofibotError::NotFound(tag.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        CofibotError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        CofibotError::Serialization(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        CofibotError::InvalidConfig(msg.into())
    }

    /// User-correctable intent data problems, including duplicate tags.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CofibotError::Validation(_) | CofibotError::DuplicateTag(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CofibotError::NotFound(_))
    }

    /// Failures reading or writing the corpus document or the model artifact.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            CofibotError::Io(_)
                | CofibotError::Json(_)
                | CofibotError::Storage(_)
                | CofibotError::Serialization(_)
        )
    }

    pub fn is_training(&self) -> bool {
        matches!(self, CofibotError::Training(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = CofibotError::validation("tag must not be empty");
        assert_eq!(error.to_string(), "Validation error: tag must not be empty");

        let error = CofibotError::duplicate_tag("greeting");
        assert_eq!(error.to_string(), "Intent already exists: greeting");

        let error = CofibotError::storage("disk full");
        assert_eq!(error.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = CofibotError::from(io_error);

        match error {
            CofibotError::Io(ref e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            _ => panic!("Expected IO error"),
        }
        assert!(error.is_storage());
    }

    #[test]
    fn test_training_error_conversion() {
        let error: CofibotError = TrainingError::TooFewTags { actual: 1 }.into();
        assert!(error.is_training());
        assert_eq!(
            error.to_string(),
            "Training error: At least 2 distinct tags are required, got 1"
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(CofibotError::duplicate_tag("a").is_validation());
        assert!(CofibotError::validation("a").is_validation());
        assert!(!CofibotError::not_found("a").is_validation());
        assert!(CofibotError::not_found("a").is_not_found());
        assert!(!CofibotError::ModelNotLoaded.is_storage());
        assert!(!CofibotError::EmptyInput.is_training());
    }
}
