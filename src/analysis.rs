//! Text analysis for intent classification.
//!
//! User messages and training patterns pass through the same pipeline before
//! they reach the TF-IDF vectorizer:
//!
//! ```text
//! Raw Text → Lowercase → RegexTokenizer → ShingleFilter → Terms
//! ```
//!
//! There is no stemming and no stop-word removal: "pas", "où" and "qui" stay
//! in the vocabulary.
//!
//! # Example
//!
//! ```
//! use cofibot::analysis::analyzer::Analyzer;
//! use cofibot::analysis::analyzer::intent::IntentAnalyzer;
//! use cofibot::config::VectorizerConfig;
//!
//! let analyzer = IntentAnalyzer::new(&VectorizerConfig::default()).unwrap();
//! let terms = analyzer.terms("Bonjour CofiBot").unwrap();
//! assert_eq!(terms, vec!["bonjour", "cofibot", "bonjour cofibot"]);
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

/// Canonical form of a message before tokenization: lower-cased and trimmed.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
