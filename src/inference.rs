//! Online classification and response selection.
//!
//! The [`InferenceService`] holds one loaded model: a fitted artifact together
//! with the corpus snapshot its replies come from. [`reload`](InferenceService::reload)
//! builds a complete replacement before swapping it in, and every request
//! clones the current `Arc` up front, so a request always finishes against the
//! model it started with.

use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::analysis::normalize;
use crate::config::InferenceConfig;
use crate::corpus::{CorpusDocument, CorpusStore};
use crate::error::{CofibotError, Result};
use crate::ml::artifact::{ArtifactStore, ModelArtifact, ModelMetadata};
use crate::ml::intent_classifier::TagProbability;

pub mod conversation;

pub use conversation::{ConversationLog, ConversationRecord};

/// A fitted model and the corpus it answers from.
#[derive(Debug)]
pub struct LoadedModel {
    artifact: ModelArtifact,
    corpus: CorpusDocument,
}

impl LoadedModel {
    pub fn new(artifact: ModelArtifact, corpus: CorpusDocument) -> Self {
        LoadedModel { artifact, corpus }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.artifact.metadata
    }

    pub fn corpus(&self) -> &CorpusDocument {
        &self.corpus
    }

    fn classify(&self, normalized: &str) -> Result<ClassificationResult> {
        let probabilities = self.artifact.model.predict_proba(normalized)?;
        let best = probabilities
            .iter()
            .fold(None::<&TagProbability>, |best, candidate| match best {
                Some(current) if current.probability >= candidate.probability => Some(current),
                _ => Some(candidate),
            })
            .ok_or(CofibotError::ModelNotLoaded)?;

        Ok(ClassificationResult {
            tag: best.tag.clone(),
            confidence: best.probability,
            probabilities,
        })
    }
}

/// Predicted tag for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub tag: String,
    /// Posterior probability of `tag`, in [0, 1].
    pub confidence: f64,
    /// Posterior of every known tag.
    pub probabilities: Vec<TagProbability>,
}

/// Reply chosen for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    pub tag: String,
    pub response: String,
    pub confidence: f64,
    /// The predicted tag had no intent in the loaded corpus.
    pub is_fallback: bool,
}

/// Answers `classify` and `respond` against the currently loaded model.
#[derive(Debug)]
pub struct InferenceService {
    corpus: CorpusStore,
    artifacts: ArtifactStore,
    config: InferenceConfig,
    current: RwLock<Option<Arc<LoadedModel>>>,
    conversations: ConversationLog,
}

impl InferenceService {
    /// Create a service with no model loaded.
    pub fn new(corpus: CorpusStore, artifacts: ArtifactStore, config: InferenceConfig) -> Self {
        let conversations = ConversationLog::new(config.history_capacity);
        InferenceService {
            corpus,
            artifacts,
            config,
            current: RwLock::new(None),
            conversations,
        }
    }

    /// Load the persisted artifact and corpus, then swap them in together.
    ///
    /// If either fails to load, the previous model stays active.
    pub fn reload(&self) -> Result<ModelMetadata> {
        let artifact = self.artifacts.load()?;
        let corpus = self.corpus.load()?;
        let metadata = artifact.metadata.clone();

        let loaded = Arc::new(LoadedModel::new(artifact, corpus));
        *self.current.write() = Some(loaded);

        info!(
            "Loaded model {} ({} tags, accuracy {:.3})",
            metadata.model_id, metadata.tag_count, metadata.accuracy
        );
        Ok(metadata)
    }

    /// The currently loaded model, if any.
    pub fn snapshot(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.snapshot().map(|loaded| loaded.metadata().clone())
    }

    /// The corpus the loaded model answers from.
    pub fn snapshot_corpus(&self) -> Option<CorpusDocument> {
        self.snapshot().map(|loaded| loaded.corpus().clone())
    }

    /// Predict the tag of `text`.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.classify_loaded(text).map(|(_, result)| result)
    }

    fn classify_loaded(&self, text: &str) -> Result<(Arc<LoadedModel>, ClassificationResult)> {
        let loaded = self.snapshot().ok_or(CofibotError::ModelNotLoaded)?;
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(CofibotError::EmptyInput);
        }
        let result = loaded.classify(&normalized)?;
        Ok((loaded, result))
    }

    /// Classify `text` and pick one of the winning intent's replies at random.
    pub fn respond(&self, text: &str) -> Result<BotResponse> {
        self.respond_with_rng(text, &mut rand::rng())
    }

    /// [`respond`](Self::respond) with a caller-provided random source.
    pub fn respond_with_rng<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<BotResponse> {
        let (loaded, result) = self.classify_loaded(text)?;
        let reply = loaded
            .corpus()
            .responses_for(&result.tag)
            .and_then(|responses| responses.choose(rng));

        let response = match reply {
            Some(reply) => BotResponse {
                tag: result.tag,
                response: reply.clone(),
                confidence: result.confidence,
                is_fallback: false,
            },
            None => {
                debug!(
                    "Predicted tag '{}' has no intent in the loaded corpus; using the fallback",
                    result.tag
                );
                BotResponse {
                    tag: self.config.fallback_tag.clone(),
                    response: self.config.fallback_response.clone(),
                    confidence: 0.0,
                    is_fallback: true,
                }
            }
        };

        self.conversations.record(
            text,
            &response.response,
            &response.tag,
            response.confidence,
        );
        Ok(response)
    }

    pub fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}
