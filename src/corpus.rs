//! The intent corpus: the single source of truth for training data and replies.
//!
//! A [`CorpusDocument`] is persisted as JSON wrapped in a top-level `intents`
//! object:
//!
//! ```json
//! {
//!   "intents": [
//!     { "tag": "greeting", "patterns": ["bonjour", "salut"], "responses": ["Bonjour !"] }
//!   ]
//! }
//! ```
//!
//! Every document is validated when it is parsed and before it is saved: tags
//! are non-empty and unique, and each intent has at least one non-blank pattern
//! and one non-blank response.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::analysis::normalize;
use crate::error::{CofibotError, Result};
use crate::ml::intent_classifier::IntentSample;

pub mod store;

pub use store::CorpusStore;

/// A named category of user request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Intent {
    /// Unique identifier of the intent.
    pub tag: String,
    /// Example phrasings used for training.
    pub patterns: Vec<String>,
    /// Candidate replies; one is picked at random per answer.
    pub responses: Vec<String>,
}

impl Intent {
    /// Create an intent without validating it.
    pub fn new<S, P, R>(tag: S, patterns: P, responses: R) -> Self
    where
        S: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Intent {
            tag: tag.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    /// Build an intent from newline-separated form fields.
    ///
    /// Each line is trimmed and blank lines are dropped before validation.
    pub fn from_lines(tag: &str, patterns: &str, responses: &str) -> Result<Self> {
        let lines = |text: &str| -> Vec<String> {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        };

        let intent = Intent {
            tag: tag.trim().to_string(),
            patterns: lines(patterns),
            responses: lines(responses),
        };
        intent.validate()?;
        Ok(intent)
    }

    /// Check the per-intent schema rules.
    pub fn validate(&self) -> Result<()> {
        if self.tag.trim().is_empty() {
            return Err(CofibotError::validation("intent tag must not be empty"));
        }
        if self.tag.trim() != self.tag {
            return Err(CofibotError::validation(format!(
                "intent tag '{}' has leading or trailing whitespace",
                self.tag
            )));
        }
        if self.patterns.is_empty() {
            return Err(CofibotError::validation(format!(
                "intent '{}' needs at least one pattern",
                self.tag
            )));
        }
        if self.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(CofibotError::validation(format!(
                "intent '{}' has a blank pattern",
                self.tag
            )));
        }
        if self.responses.is_empty() {
            return Err(CofibotError::validation(format!(
                "intent '{}' needs at least one response",
                self.tag
            )));
        }
        if self.responses.iter().any(|r| r.trim().is_empty()) {
            return Err(CofibotError::validation(format!(
                "intent '{}' has a blank response",
                self.tag
            )));
        }
        Ok(())
    }
}

/// The full list of intents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusDocument {
    pub intents: Vec<Intent>,
}

/// Inventory counts over a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_intents: usize,
    pub total_patterns: usize,
    pub total_responses: usize,
}

impl CorpusDocument {
    /// Create a validated document.
    pub fn new(intents: Vec<Intent>) -> Result<Self> {
        let document = CorpusDocument { intents };
        document.validate()?;
        Ok(document)
    }

    /// Parse and validate a JSON document.
    ///
    /// Syntax errors surface as [`CofibotError::Json`]; well-formed JSON that
    /// does not match the schema surfaces as [`CofibotError::Validation`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let document: CorpusDocument = serde_json::from_slice(bytes).map_err(|e| {
            if e.classify() == Category::Data {
                CofibotError::validation(format!("corpus schema mismatch: {e}"))
            } else {
                CofibotError::Json(e)
            }
        })?;
        document.validate()?;
        Ok(document)
    }

    /// Serialize as pretty-printed JSON (two-space indent, non-ASCII kept as is).
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Check every intent and tag uniqueness.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.intents.len());
        for intent in &self.intents {
            intent.validate()?;
            if !seen.insert(intent.tag.as_str()) {
                return Err(CofibotError::validation(format!(
                    "duplicate intent tag '{}'",
                    intent.tag
                )));
            }
        }
        Ok(())
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&Intent> {
        self.intents.iter().find(|intent| intent.tag == tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Tags in document order.
    pub fn tags(&self) -> Vec<&str> {
        self.intents.iter().map(|intent| intent.tag.as_str()).collect()
    }

    /// Candidate replies for a tag.
    pub fn responses_for(&self, tag: &str) -> Option<&[String]> {
        self.get(tag).map(|intent| intent.responses.as_slice())
    }

    /// Add a new intent at the end of the document.
    pub fn append_intent(&mut self, intent: Intent) -> Result<()> {
        intent.validate()?;
        if self.contains(&intent.tag) {
            return Err(CofibotError::duplicate_tag(intent.tag));
        }
        self.intents.push(intent);
        Ok(())
    }

    /// Replace the intent tagged `tag` in place, returning the previous one.
    ///
    /// The replacement may carry a different tag, as long as that tag is not
    /// used by another intent.
    pub fn replace_intent(&mut self, tag: &str, intent: Intent) -> Result<Intent> {
        intent.validate()?;
        let index = self.position(tag)?;
        if intent.tag != tag && self.contains(&intent.tag) {
            return Err(CofibotError::duplicate_tag(intent.tag));
        }
        Ok(std::mem::replace(&mut self.intents[index], intent))
    }

    /// Remove the intent tagged `tag`, returning it.
    pub fn remove_intent(&mut self, tag: &str) -> Result<Intent> {
        let index = self.position(tag)?;
        Ok(self.intents.remove(index))
    }

    /// One normalized sample per (intent, pattern) pair, in document order.
    pub fn training_samples(&self) -> Vec<IntentSample> {
        self.intents
            .iter()
            .flat_map(|intent| {
                intent.patterns.iter().map(|pattern| IntentSample {
                    text: normalize(pattern),
                    tag: intent.tag.clone(),
                })
            })
            .collect()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            total_intents: self.intents.len(),
            total_patterns: self.intents.iter().map(|i| i.patterns.len()).sum(),
            total_responses: self.intents.iter().map(|i| i.responses.len()).sum(),
        }
    }

    /// Number of patterns per tag.
    pub fn pattern_counts(&self) -> BTreeMap<&str, usize> {
        self.intents
            .iter()
            .map(|intent| (intent.tag.as_str(), intent.patterns.len()))
            .collect()
    }

    fn position(&self, tag: &str) -> Result<usize> {
        self.intents
            .iter()
            .position(|intent| intent.tag == tag)
            .ok_or_else(|| CofibotError::not_found(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> CorpusDocument {
        CorpusDocument::new(vec![
            Intent::new("greeting", ["bonjour", "salut"], ["Bonjour !"]),
            Intent::new("farewell", ["au revoir", "bye"], ["Au revoir !"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_json_round_trip_is_stable() {
        let document = sample_document();
        let bytes = document.to_json_pretty().unwrap();
        let reparsed = CorpusDocument::from_json(&bytes).unwrap();

        assert_eq!(reparsed, document);
        assert_eq!(reparsed.to_json_pretty().unwrap(), bytes);
    }

    #[test]
    fn test_pretty_json_keeps_accents() {
        let document =
            CorpusDocument::new(vec![Intent::new("energie", ["énergie"], ["Voilà"])]).unwrap();
        let json = String::from_utf8(document.to_json_pretty().unwrap()).unwrap();
        assert!(json.contains("\"énergie\""));
        assert!(json.starts_with("{\n  \"intents\": ["));
    }

    #[test]
    fn test_from_json_rejects_duplicates_and_missing_fields() {
        let duplicate = br#"{"intents": [
            {"tag": "a", "patterns": ["x"], "responses": ["y"]},
            {"tag": "a", "patterns": ["z"], "responses": ["w"]}
        ]}"#;
        assert!(matches!(
            CorpusDocument::from_json(duplicate),
            Err(CofibotError::Validation(_))
        ));

        let missing = br#"{"intents": [{"tag": "a", "patterns": ["x"]}]}"#;
        assert!(matches!(
            CorpusDocument::from_json(missing),
            Err(CofibotError::Validation(_))
        ));

        let corrupt = br#"{"intents": [{"tag": "a""#;
        assert!(matches!(
            CorpusDocument::from_json(corrupt),
            Err(CofibotError::Json(_))
        ));
    }

    #[test]
    fn test_append_duplicate_tag() {
        let mut document = sample_document();
        let err = document
            .append_intent(Intent::new("greeting", ["coucou"], ["Coucou"]))
            .unwrap_err();
        assert!(matches!(err, CofibotError::DuplicateTag(ref tag) if tag == "greeting"));
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_replace_intent() {
        let mut document = sample_document();
        let previous = document
            .replace_intent("greeting", Intent::new("greeting", ["coucou"], ["Coucou !"]))
            .unwrap();
        assert_eq!(previous.patterns, vec!["bonjour", "salut"]);
        assert_eq!(document.tags(), vec!["greeting", "farewell"]);
        assert_eq!(document.responses_for("greeting").unwrap(), ["Coucou !"]);

        let err = document
            .replace_intent("missing", Intent::new("missing", ["x"], ["y"]))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = document
            .replace_intent("greeting", Intent::new("farewell", ["x"], ["y"]))
            .unwrap_err();
        assert!(matches!(err, CofibotError::DuplicateTag(_)));
    }

    #[test]
    fn test_replace_can_rename() {
        let mut document = sample_document();
        document
            .replace_intent("greeting", Intent::new("hello", ["bonjour"], ["Salut !"]))
            .unwrap();
        assert_eq!(document.tags(), vec!["hello", "farewell"]);
    }

    #[test]
    fn test_remove_intent() {
        let mut document = sample_document();
        let removed = document.remove_intent("farewell").unwrap();
        assert_eq!(removed.tag, "farewell");
        assert_eq!(document.tags(), vec!["greeting"]);
        assert!(document.remove_intent("farewell").unwrap_err().is_not_found());
    }

    #[test]
    fn test_intent_validation() {
        assert!(Intent::new("", ["a"], ["b"]).validate().is_err());
        assert!(Intent::new(" a", ["a"], ["b"]).validate().is_err());
        assert!(Intent::new("a", Vec::<String>::new(), ["b"]).validate().is_err());
        assert!(Intent::new("a", ["  "], ["b"]).validate().is_err());
        assert!(Intent::new("a", ["x"], Vec::<String>::new()).validate().is_err());
        assert!(Intent::new("a", ["x"], ["y"]).validate().is_ok());
    }

    #[test]
    fn test_from_lines_trims_and_drops_blanks() {
        let intent = Intent::from_lines(
            " horaires ",
            "quels sont les horaires\n\n  horaires d'ouverture  \n",
            "De 8h à 17h\r\n",
        )
        .unwrap();

        assert_eq!(intent.tag, "horaires");
        assert_eq!(
            intent.patterns,
            vec!["quels sont les horaires", "horaires d'ouverture"]
        );
        assert_eq!(intent.responses, vec!["De 8h à 17h"]);

        assert!(Intent::from_lines("x", "\n\n", "reply").is_err());
    }

    #[test]
    fn test_training_samples_are_normalized() {
        let document = CorpusDocument::new(vec![
            Intent::new("greeting", ["Bonjour", " SALUT "], ["Bonjour !"]),
            Intent::new("farewell", ["Bye"], ["Au revoir !"]),
        ])
        .unwrap();

        let samples = document.training_samples();
        let texts: Vec<&str> = samples.iter().map(|s| s.text.as_str()).collect();
        let tags: Vec<&str> = samples.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(texts, vec!["bonjour", "salut", "bye"]);
        assert_eq!(tags, vec!["greeting", "greeting", "farewell"]);
    }

    #[test]
    fn test_stats() {
        let stats = sample_document().stats();
        assert_eq!(
            stats,
            CorpusStats {
                total_intents: 2,
                total_patterns: 4,
                total_responses: 2,
            }
        );
        assert_eq!(sample_document().pattern_counts()["farewell"], 2);
    }
}
