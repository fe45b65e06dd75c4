//! Analyzers combine a tokenizer with a chain of token filters.
//!
//! - [`PipelineAnalyzer`](pipeline::PipelineAnalyzer) - tokenizer + ordered filters
//! - [`IntentAnalyzer`](intent::IntentAnalyzer) - the pipeline used for intent
//!   classification, built from a [`VectorizerConfig`](crate::config::VectorizerConfig)

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod intent;
pub mod pipeline;

pub use intent::IntentAnalyzer;
pub use pipeline::PipelineAnalyzer;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so a fitted vectorizer holding an analyzer
/// can be shared between concurrent classification calls.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and keep only the token texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}
