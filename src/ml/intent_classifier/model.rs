//! A fitted feature extractor and classifier, used as one unit.

use serde::{Deserialize, Serialize};

use crate::config::{ClassifierConfig, VectorizerConfig};
use crate::error::Result;

use super::classifier::IntentClassifier;
use super::logistic::LogisticRegression;
use super::tfidf::TfIdfVectorizer;
use super::types::{Deadline, IntentSample, TagProbability};

/// TF-IDF features fed to a logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentModel {
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
}

impl IntentModel {
    /// Fit the vectorizer on the sample texts, then the classifier on their vectors.
    pub fn fit(
        samples: &[IntentSample],
        vectorizer_config: &VectorizerConfig,
        classifier_config: &ClassifierConfig,
        deadline: Option<&Deadline>,
    ) -> Result<Self> {
        let texts: Vec<String> = samples.iter().map(|s| s.text.clone()).collect();
        let tags: Vec<String> = samples.iter().map(|s| s.tag.clone()).collect();

        let mut vectorizer = TfIdfVectorizer::new(vectorizer_config.clone())?;
        vectorizer.fit(&texts)?;
        if let Some(deadline) = deadline {
            deadline.check()?;
        }

        let features = vectorizer.transform_batch(&texts)?;
        let classifier = LogisticRegression::fit(&features, &tags, classifier_config, deadline)?;

        Ok(IntentModel {
            vectorizer,
            classifier,
        })
    }

    /// Posterior over every known tag for a normalized text.
    pub fn predict_proba(&self, text: &str) -> Result<Vec<TagProbability>> {
        let features = self.vectorizer.transform(text)?;
        self.classifier.predict_proba(&features)
    }

    /// The most probable tag for a normalized text.
    pub fn predict(&self, text: &str) -> Result<TagProbability> {
        let features = self.vectorizer.transform(text)?;
        self.classifier.predict(&features)
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<IntentSample> {
        vec![
            IntentSample::new("bonjour", "greeting"),
            IntentSample::new("salut", "greeting"),
            IntentSample::new("au revoir", "farewell"),
            IntentSample::new("bye", "farewell"),
        ]
    }

    fn model() -> IntentModel {
        IntentModel::fit(
            &samples(),
            &VectorizerConfig::default(),
            &ClassifierConfig::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_training_patterns_classified() {
        let model = model();
        for sample in samples() {
            let prediction = model.predict(&sample.text).unwrap();
            assert_eq!(prediction.tag, sample.tag);
            assert!(prediction.probability >= 0.5);
        }
    }

    #[test]
    fn test_unknown_text_has_low_confidence() {
        let model = model();
        let prediction = model.predict("xyz123").unwrap();
        assert!(model.labels().contains(&prediction.tag));
        assert!(prediction.probability < 0.6);
    }

    #[test]
    fn test_bincode_round_trip_predicts_identically() {
        let model = model();
        let bytes = bincode::serialize(&model).unwrap();
        let restored: IntentModel = bincode::deserialize(&bytes).unwrap();

        assert_eq!(
            restored.predict_proba("bonjour").unwrap(),
            model.predict_proba("bonjour").unwrap()
        );
        assert_eq!(restored.labels(), ["greeting", "farewell"]);
    }
}
