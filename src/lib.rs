//! # CofiBot
//!
//! Intent classification and response selection for the CofiBot assistant.
//!
//! ## Features
//!
//! - JSON intent corpus with schema validation and atomic saves
//! - TF-IDF features over word unigrams and bigrams
//! - Softmax logistic regression with calibrated confidences
//! - Seeded, reproducible training with held-out accuracy
//! - Versioned, checksummed model artifacts
//! - Hot model reload that never blocks inference
//! - Admin mutations that retrain and reload in one serialized step

pub mod admin;
pub mod analysis;
pub mod bot;
pub mod config;
pub mod corpus;
pub mod error;
pub mod inference;
pub mod ml;
pub mod storage;

pub mod prelude {
    pub use crate::bot::Cofibot;
    pub use crate::config::CofibotConfig;
    pub use crate::corpus::{CorpusDocument, Intent};
    pub use crate::error::{CofibotError, Result};
    pub use crate::inference::{BotResponse, ClassificationResult};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
