//! Configuration for the CofiBot engine.
//!
//! All sections deserialize with `#[serde(default)]`, so a config file only needs
//! to list the values it overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CofibotError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CofibotConfig {
    /// Directory holding the corpus document and the model artifact.
    pub data_dir: PathBuf,
    /// Corpus document file name, relative to `data_dir`.
    pub corpus_file: String,
    /// Model artifact file name, relative to `data_dir`.
    pub model_file: String,
    /// Feature extraction settings.
    pub vectorizer: VectorizerConfig,
    /// Classifier settings.
    pub classifier: ClassifierConfig,
    /// Training orchestration settings.
    pub trainer: TrainerConfig,
    /// Inference and conversation log settings.
    pub inference: InferenceConfig,
}

impl Default for CofibotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("nlp"),
            corpus_file: "intents.json".to_string(),
            model_file: "model.bin".to_string(),
            vectorizer: VectorizerConfig::default(),
            classifier: ClassifierConfig::default(),
            trainer: TrainerConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl CofibotConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CofibotConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration rooted at the given data directory.
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.corpus_file.trim().is_empty() || self.model_file.trim().is_empty() {
            return Err(CofibotError::invalid_config(
                "corpus_file and model_file must not be empty",
            ));
        }
        if self.corpus_file == self.model_file {
            return Err(CofibotError::invalid_config(
                "corpus_file and model_file must differ",
            ));
        }
        self.vectorizer.validate()?;
        self.classifier.validate()?;
        self.trainer.validate()?;
        Ok(())
    }
}

/// TF-IDF feature extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Regex whose matches are the base tokens.
    pub token_pattern: String,
    /// Smallest word n-gram emitted.
    pub min_ngram: usize,
    /// Largest word n-gram emitted.
    pub max_ngram: usize,
    /// Vocabulary cap; most frequent terms are kept.
    pub max_features: usize,
    /// Lower-case text before tokenizing.
    pub lowercase: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            token_pattern: r"\b\w\w+\b".to_string(),
            min_ngram: 1,
            max_ngram: 2,
            max_features: 1000,
            lowercase: true,
        }
    }
}

impl VectorizerConfig {
    fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.token_pattern)
            .map_err(|e| CofibotError::invalid_config(format!("token_pattern: {e}")))?;
        if self.min_ngram == 0 || self.max_ngram < self.min_ngram {
            return Err(CofibotError::invalid_config(format!(
                "invalid n-gram range ({}, {})",
                self.min_ngram, self.max_ngram
            )));
        }
        if self.max_features == 0 {
            return Err(CofibotError::invalid_config("max_features must be > 0"));
        }
        Ok(())
    }
}

/// Logistic regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Upper bound on gradient descent iterations.
    pub max_iterations: usize,
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// L2 penalty strength (inverse of the usual `C`).
    pub l2_strength: f64,
    /// Stop once the loss improves by less than this.
    pub tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            learning_rate: 0.5,
            l2_strength: 1.0,
            tolerance: 1e-6,
        }
    }
}

impl ClassifierConfig {
    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CofibotError::invalid_config("max_iterations must be > 0"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(CofibotError::invalid_config(
                "learning_rate must be a positive number",
            ));
        }
        if !(self.l2_strength >= 0.0 && self.l2_strength.is_finite()) {
            return Err(CofibotError::invalid_config("l2_strength must be >= 0"));
        }
        if self.tolerance < 0.0 {
            return Err(CofibotError::invalid_config("tolerance must be >= 0"));
        }
        Ok(())
    }
}

/// Training orchestration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Fraction of examples held out for evaluation.
    pub test_ratio: f64,
    /// Seed for the train/held-out shuffle.
    pub seed: u64,
    /// Refit on every example after evaluating, and persist that model.
    pub refit_on_full_corpus: bool,
    /// Wall-clock limit for one training run, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            refit_on_full_corpus: true,
            timeout_secs: Some(300),
        }
    }
}

impl TrainerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(CofibotError::invalid_config(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(CofibotError::invalid_config("timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Inference and conversation history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Tag reported when the predicted tag has no intent in the corpus.
    pub fallback_tag: String,
    /// Reply sent together with `fallback_tag`.
    pub fallback_response: String,
    /// Maximum number of retained conversation records; `None` keeps all.
    pub history_capacity: Option<usize>,
    /// Number of records returned by the history view.
    pub history_view: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            fallback_tag: "unknown".to_string(),
            fallback_response: "Je ne comprends pas ta demande 😕. Peux-tu reformuler ?"
                .to_string(),
            history_capacity: Some(1000),
            history_view: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CofibotConfig::default();
        assert_eq!(config.corpus_file, "intents.json");
        assert_eq!(config.model_file, "model.bin");
        assert_eq!(config.vectorizer.max_ngram, 2);
        assert_eq!(config.vectorizer.max_features, 1000);
        assert_eq!(config.trainer.seed, 42);
        assert_eq!(config.inference.fallback_tag, "unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CofibotConfig =
            serde_json::from_str(r#"{"trainer": {"test_ratio": 0.3}}"#).unwrap();
        assert_eq!(config.trainer.test_ratio, 0.3);
        assert_eq!(config.trainer.seed, 42);
        assert_eq!(config.classifier.max_iterations, 1000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = CofibotConfig::default();
        config.trainer.test_ratio = 1.0;
        assert!(config.validate().is_err());

        let mut config = CofibotConfig::default();
        config.vectorizer.min_ngram = 3;
        assert!(config.validate().is_err());

        let mut config = CofibotConfig::default();
        config.vectorizer.token_pattern = "(".to_string();
        assert!(matches!(
            config.validate(),
            Err(CofibotError::InvalidConfig(_))
        ));

        let mut config = CofibotConfig::default();
        config.model_file = config.corpus_file.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cofibot.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/cofibot", "trainer": {"seed": 7}}"#)
            .unwrap();

        let config = CofibotConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/cofibot"));
        assert_eq!(config.trainer.seed, 7);
        assert_eq!(config.trainer.timeout(), Some(Duration::from_secs(300)));
    }
}
