//! TF-IDF vectorizer for text feature extraction.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, IntentAnalyzer};
use crate::config::VectorizerConfig;
use crate::error::{CofibotError, Result, TrainingError};

/// TF-IDF vectorizer for text feature extraction.
///
/// Terms are the word n-grams produced by an [`IntentAnalyzer`]. Fitting keeps
/// at most `max_features` terms, the most frequent across the corpus, with
/// ties going to the term seen first. Transformed vectors are L2-normalized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "TfIdfState", into = "TfIdfState")]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Terms in index order.
    terms: Vec<String>,
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    analyzer: IntentAnalyzer,
}

/// The persisted part of a [`TfIdfVectorizer`]; the analyzer and the reverse
/// vocabulary are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct TfIdfState {
    config: VectorizerConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl TryFrom<TfIdfState> for TfIdfVectorizer {
    type Error = CofibotError;

    fn try_from(state: TfIdfState) -> Result<Self> {
        if state.terms.len() != state.idf.len() {
            return Err(CofibotError::serialization(format!(
                "vectorizer has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            )));
        }
        let analyzer = IntentAnalyzer::new(&state.config)?;
        let vocabulary = index_terms(&state.terms);
        Ok(TfIdfVectorizer {
            config: state.config,
            terms: state.terms,
            vocabulary,
            idf: state.idf,
            n_documents: state.n_documents,
            analyzer,
        })
    }
}

impl From<TfIdfVectorizer> for TfIdfState {
    fn from(vectorizer: TfIdfVectorizer) -> Self {
        TfIdfState {
            config: vectorizer.config,
            terms: vectorizer.terms,
            idf: vectorizer.idf,
            n_documents: vectorizer.n_documents,
        }
    }
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.terms.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        let analyzer = IntentAnalyzer::new(&config)?;
        Ok(Self {
            config,
            terms: Vec::new(),
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            analyzer,
        })
    }

    /// Fit the vectorizer on training documents.
    ///
    /// Deterministic for a given document order.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(TrainingError::EmptyCorpus.into());
        }

        let tokenized: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| self.analyzer.terms(doc))
            .collect::<Result<_>>()?;

        // Per term, in first-seen order: (term, corpus frequency, document frequency).
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut stats: Vec<(&str, usize, usize)> = Vec::new();
        for tokens in &tokenized {
            let mut in_document: HashSet<usize> = HashSet::new();
            for token in tokens {
                let idx = *seen.entry(token.as_str()).or_insert_with(|| {
                    stats.push((token.as_str(), 0, 0));
                    stats.len() - 1
                });
                stats[idx].1 += 1;
                if in_document.insert(idx) {
                    stats[idx].2 += 1;
                }
            }
        }

        if stats.is_empty() {
            return Err(TrainingError::Fit(
                "empty vocabulary: no pattern contains a token".to_string(),
            )
            .into());
        }

        let mut kept: Vec<usize> = (0..stats.len()).collect();
        if kept.len() > self.config.max_features {
            // Stable sort keeps first-seen order among equal frequencies.
            kept.sort_by(|&a, &b| stats[b].1.cmp(&stats[a].1));
            kept.truncate(self.config.max_features);
            kept.sort_unstable();
        }

        let n_documents = documents.len();
        let terms: Vec<String> = kept.iter().map(|&i| stats[i].0.to_string()).collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|&i| {
                let df = stats[i].2 as f64;
                // IDF = ln((N + 1) / (df + 1)) + 1
                ((n_documents as f64 + 1.0) / (df + 1.0)).ln() + 1.0
            })
            .collect();

        self.vocabulary = index_terms(&terms);
        self.terms = terms;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a document into an L2-normalized TF-IDF feature vector.
    ///
    /// Out-of-vocabulary terms are ignored; a document with no known term maps
    /// to the zero vector.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        let tokens = self.analyzer.terms(document)?;
        let mut features = vec![0.0; self.terms.len()];

        for token in &tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                features[idx] += 1.0;
            }
        }

        for (value, idf) in features.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = features.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut features {
                *value /= norm;
            }
        }

        Ok(features)
    }

    /// Transform many documents in parallel, preserving order.
    pub fn transform_batch(&self, documents: &[String]) -> Result<Vec<Vec<f64>>> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc))
            .collect()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Terms in feature index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

fn index_terms(terms: &[String]) -> HashMap<String, usize> {
    terms
        .iter()
        .enumerate()
        .map(|(idx, term)| (term.clone(), idx))
        .collect()
}
