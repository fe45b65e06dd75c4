//! Machine learning for intent classification.
//!
//! - [`intent_classifier`]: TF-IDF features and a softmax classifier
//! - [`split`]: train / held-out splitting
//! - [`trainer`]: the training pipeline, from corpus to persisted artifact
//! - [`artifact`]: the versioned on-disk model format

pub mod artifact;
pub mod intent_classifier;
pub mod split;
pub mod trainer;

pub use artifact::{ArtifactStore, ModelArtifact, ModelMetadata};
pub use intent_classifier::{IntentClassifier, IntentModel, IntentSample};
pub use split::SplitStrategy;
pub use trainer::{Trainer, TrainingReport};
