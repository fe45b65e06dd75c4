//! Intent administration: corpus mutations followed by a forced retrain.
//!
//! Every mutation walks the same stages:
//!
//! ```text
//! Received -> Validated -> Persisted -> Retrained -> Reloaded
//! ```
//!
//! A failure before `Persisted` rolls the request back: the error is returned
//! and storage is untouched. Once the corpus is saved the mutation stands, even
//! when retraining or reloading fails afterwards; the returned
//! [`CommitResult`] then says the live model is stale.
//!
//! Mutations and manual retrains are serialized by one lock. Inference never
//! takes it.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::corpus::{CorpusDocument, CorpusStore, Intent};
use crate::error::Result;
use crate::inference::InferenceService;
use crate::ml::trainer::{Trainer, TrainingReport};

/// Progress of one mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationStage {
    Received,
    Validated,
    Persisted,
    Retrained,
    Reloaded,
    RolledBack,
}

/// Kind of corpus mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// What happened after the corpus was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitOutcome {
    /// Retrained and reloaded; the live model matches the corpus.
    Committed { report: TrainingReport },
    /// The corpus was saved but training failed; the previous model is still
    /// live and may disagree with the stored intents.
    RetrainFailed { error: String },
    /// The corpus and the new artifact were saved but the live model could not
    /// be swapped; it is stale until the next successful reload.
    ReloadFailed {
        report: TrainingReport,
        error: String,
    },
}

/// Result of a mutation whose corpus change was persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    pub kind: MutationKind,
    /// Tag the mutation was addressed to.
    pub tag: String,
    pub outcome: CommitOutcome,
    /// Stages reached, in order.
    pub stages: Vec<MutationStage>,
}

impl CommitResult {
    /// The live model reflects the mutation.
    pub fn is_fully_committed(&self) -> bool {
        matches!(self.outcome, CommitOutcome::Committed { .. })
    }

    /// The live model may disagree with the stored corpus.
    pub fn model_is_stale(&self) -> bool {
        !self.is_fully_committed()
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        match &self.outcome {
            CommitOutcome::Committed { report } | CommitOutcome::ReloadFailed { report, .. } => {
                Some(report)
            }
            CommitOutcome::RetrainFailed { .. } => None,
        }
    }

    /// Last stage reached.
    pub fn stage(&self) -> MutationStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(MutationStage::Received)
    }
}

/// Runs the mutation protocol against one corpus, trainer and inference service.
#[derive(Debug)]
pub struct IntentAdmin {
    corpus: CorpusStore,
    trainer: Trainer,
    inference: Arc<InferenceService>,
    lock: Mutex<()>,
}

impl IntentAdmin {
    pub fn new(corpus: CorpusStore, trainer: Trainer, inference: Arc<InferenceService>) -> Self {
        IntentAdmin {
            corpus,
            trainer,
            inference,
            lock: Mutex::new(()),
        }
    }

    /// Intents as currently stored.
    pub fn list_intents(&self) -> Result<Vec<Intent>> {
        Ok(self.corpus.load()?.intents)
    }

    /// Add a new intent. Fails with `DuplicateTag` if the tag exists.
    pub fn create_intent(&self, intent: Intent) -> Result<CommitResult> {
        let tag = intent.tag.clone();
        self.commit(MutationKind::Create, &tag, |document| {
            document.append_intent(intent)
        })
    }

    /// Replace the intent tagged `tag`. Fails with `NotFound` if it does not exist.
    pub fn update_intent(&self, tag: &str, intent: Intent) -> Result<CommitResult> {
        self.commit(MutationKind::Update, tag, |document| {
            document.replace_intent(tag, intent).map(drop)
        })
    }

    /// Remove the intent tagged `tag`. Fails with `NotFound` if it does not exist.
    pub fn delete_intent(&self, tag: &str) -> Result<CommitResult> {
        self.commit(MutationKind::Delete, tag, |document| {
            document.remove_intent(tag).map(drop)
        })
    }

    /// Retrain from the stored corpus and reload the live model.
    pub fn retrain(&self) -> Result<TrainingReport> {
        let _guard = self.lock.lock();
        let report = self.trainer.run()?;
        self.inference.reload()?;
        Ok(report)
    }

    fn commit<F>(&self, kind: MutationKind, tag: &str, mutate: F) -> Result<CommitResult>
    where
        F: FnOnce(&mut CorpusDocument) -> Result<()>,
    {
        let _guard = self.lock.lock();
        let mut stages = Vec::with_capacity(5);
        let mut advance = |stage: MutationStage| {
            debug!("{kind:?} '{tag}': {stage:?}");
            stages.push(stage);
        };
        advance(MutationStage::Received);

        let validated = self
            .corpus
            .load()
            .and_then(|mut document| mutate(&mut document).map(|()| document));
        let document = match validated {
            Ok(document) => document,
            Err(e) => {
                debug!("{kind:?} '{tag}': {:?}: {e}", MutationStage::RolledBack);
                return Err(e);
            }
        };
        advance(MutationStage::Validated);

        if let Err(e) = self.corpus.save(&document) {
            warn!(
                "{kind:?} '{tag}': {:?}, corpus save failed: {e}",
                MutationStage::RolledBack
            );
            return Err(e);
        }
        advance(MutationStage::Persisted);

        let outcome = match self.trainer.run() {
            Err(e) => {
                warn!("{kind:?} '{tag}': corpus saved but retraining failed: {e}");
                CommitOutcome::RetrainFailed {
                    error: e.to_string(),
                }
            }
            Ok(report) => {
                advance(MutationStage::Retrained);
                match self.inference.reload() {
                    Err(e) => {
                        warn!("{kind:?} '{tag}': model saved but reload failed: {e}");
                        CommitOutcome::ReloadFailed {
                            report,
                            error: e.to_string(),
                        }
                    }
                    Ok(_) => {
                        advance(MutationStage::Reloaded);
                        info!(
                            "{kind:?} '{tag}': committed (accuracy {:.3})",
                            report.accuracy
                        );
                        CommitOutcome::Committed { report }
                    }
                }
            }
        };

        Ok(CommitResult {
            kind,
            tag: tag.to_string(),
            outcome,
            stages,
        })
    }
}
