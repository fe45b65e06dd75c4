//! Intent classification using TF-IDF features and logistic regression.
//!
//! # Architecture
//!
//! - `IntentClassifier` trait: common interface over feature vectors
//! - `LogisticRegression`: multinomial softmax classifier
//! - `TfIdfVectorizer`: feature extraction using TF-IDF over word n-grams
//! - `IntentModel`: a fitted vectorizer and classifier pair
//! - `IntentSample`: training data structure
//!
//! # Example
//!
//! ```
//! use cofibot::config::{ClassifierConfig, VectorizerConfig};
//! use cofibot::ml::intent_classifier::{IntentModel, IntentSample};
//!
//! # fn main() -> cofibot::error::Result<()> {
//! let samples = vec![
//!     IntentSample::new("bonjour", "greeting"),
//!     IntentSample::new("salut", "greeting"),
//!     IntentSample::new("au revoir", "farewell"),
//!     IntentSample::new("bye", "farewell"),
//! ];
//!
//! let model = IntentModel::fit(
//!     &samples,
//!     &VectorizerConfig::default(),
//!     &ClassifierConfig::default(),
//!     None,
//! )?;
//!
//! let prediction = model.predict("bonjour")?;
//! assert_eq!(prediction.tag, "greeting");
//! # Ok(())
//! # }
//! ```

mod classifier;
mod logistic;
mod model;
mod tfidf;
mod types;

// Public exports
pub use classifier::IntentClassifier;
pub use logistic::LogisticRegression;
pub use model::IntentModel;
pub use tfidf::TfIdfVectorizer;
pub use types::{Deadline, IntentSample, TagProbability};
