//! The analyzer used for intent classification.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LowercaseFilter, ShingleFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::config::VectorizerConfig;
use crate::error::Result;

/// Regex tokens, optionally lower-cased, expanded to word n-grams.
///
/// Built entirely from a [`VectorizerConfig`], so a persisted vectorizer can
/// rebuild the exact analyzer it was fitted with.
#[derive(Clone, Debug)]
pub struct IntentAnalyzer {
    inner: PipelineAnalyzer,
}

impl IntentAnalyzer {
    pub fn new(config: &VectorizerConfig) -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::with_pattern(&config.token_pattern)?);
        let mut inner = PipelineAnalyzer::new(tokenizer);
        if config.lowercase {
            inner = inner.add_filter(Arc::new(LowercaseFilter::new()));
        }
        inner = inner.add_filter(Arc::new(ShingleFilter::new(
            config.min_ngram,
            config.max_ngram,
        )?));

        Ok(IntentAnalyzer { inner })
    }
}

impl Analyzer for IntentAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "intent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intent_analyzer() {
        let analyzer = IntentAnalyzer::new(&VectorizerConfig::default()).unwrap();
        let terms = analyzer.terms("Quelle est la consommation ?").unwrap();
        assert_eq!(
            terms,
            vec![
                "quelle",
                "est",
                "la",
                "consommation",
                "quelle est",
                "est la",
                "la consommation"
            ]
        );
    }

    #[test]
    fn test_case_sensitive_unigrams() {
        let config = VectorizerConfig {
            lowercase: false,
            max_ngram: 1,
            ..VectorizerConfig::default()
        };
        let analyzer = IntentAnalyzer::new(&config).unwrap();
        assert_eq!(analyzer.terms("Bonjour Salut").unwrap(), vec!["Bonjour", "Salut"]);
    }
}
