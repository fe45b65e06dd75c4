//! The CofiBot engine as one object.
//!
//! [`Cofibot`] wires the corpus store, trainer, inference service and admin
//! protocol over a single [`Storage`] backend. It is what an HTTP layer holds.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cofibot::bot::Cofibot;
//! use cofibot::config::CofibotConfig;
//! use cofibot::corpus::{CorpusDocument, CorpusStore, Intent};
//! use cofibot::storage::memory::MemoryStorage;
//!
//! # fn main() -> cofibot::error::Result<()> {
//! let storage = Arc::new(MemoryStorage::new_default());
//! let config = CofibotConfig::default();
//! CorpusStore::new(storage.clone(), config.corpus_file.clone()).save(&CorpusDocument::new(vec![
//!     Intent::new("greeting", ["bonjour", "salut"], ["Bonjour !"]),
//!     Intent::new("farewell", ["au revoir", "bye"], ["Au revoir !"]),
//! ])?)?;
//!
//! let bot = Cofibot::with_storage(storage, config)?;
//! bot.retrain()?;
//!
//! let reply = bot.respond("Bonjour")?;
//! assert_eq!(reply.tag, "greeting");
//! assert_eq!(reply.response, "Bonjour !");
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::admin::{CommitResult, IntentAdmin};
use crate::config::CofibotConfig;
use crate::corpus::{CorpusStore, Intent};
use crate::error::Result;
use crate::inference::{BotResponse, ClassificationResult, ConversationRecord, InferenceService};
use crate::ml::artifact::ArtifactStore;
use crate::ml::trainer::{Trainer, TrainingReport};
use crate::storage::file::FileStorage;
use crate::storage::{Storage, StorageConfig};

/// Inventory and usage counters for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_intents: usize,
    pub total_patterns: usize,
    pub total_responses: usize,
    /// Retained conversation records.
    pub total_conversations: usize,
    /// Retained conversation records per answered tag.
    pub intent_usage: BTreeMap<String, usize>,
    /// Accuracy of the loaded model, if one is loaded.
    pub model_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Healthy,
    /// No model is loaded; classification requests fail.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: Health,
    pub model_loaded: bool,
    pub intents_loaded: bool,
    /// Intents in the corpus the live model answers from.
    pub total_intents: usize,
}

/// Corpus, model and admin protocol over one storage backend.
#[derive(Debug)]
pub struct Cofibot {
    config: CofibotConfig,
    corpus: CorpusStore,
    inference: Arc<InferenceService>,
    admin: IntentAdmin,
}

impl Cofibot {
    /// Open the engine on files under `config.data_dir`.
    ///
    /// A missing model artifact is not an error: the engine starts without a
    /// model and `classify` fails with `ModelNotLoaded` until a retrain.
    pub fn open(config: CofibotConfig) -> Result<Self> {
        config.validate()?;
        let storage = Arc::new(FileStorage::new(&config.data_dir, StorageConfig::default())?);
        Self::with_storage(storage, config)
    }

    /// Like [`open`](Self::open), but trains a model when none is persisted yet.
    pub fn open_or_train(config: CofibotConfig) -> Result<Self> {
        let bot = Self::open(config)?;
        if !bot.inference.is_loaded() {
            info!("No usable model artifact; training one");
            bot.retrain()?;
        }
        Ok(bot)
    }

    /// Build the engine on an arbitrary storage backend.
    pub fn with_storage(storage: Arc<dyn Storage>, config: CofibotConfig) -> Result<Self> {
        config.validate()?;
        let corpus = CorpusStore::new(storage.clone(), config.corpus_file.clone());
        let artifacts = ArtifactStore::new(storage, config.model_file.clone());

        let inference = Arc::new(InferenceService::new(
            corpus.clone(),
            artifacts.clone(),
            config.inference.clone(),
        ));
        if artifacts.exists() {
            if let Err(e) = inference.reload() {
                warn!("Could not load model '{}': {e}", artifacts.file_name());
            }
        } else {
            warn!(
                "No model artifact '{}' yet; classification is unavailable until a retrain",
                artifacts.file_name()
            );
        }

        let trainer = Trainer::from_config(corpus.clone(), artifacts, &config);
        let admin = IntentAdmin::new(corpus.clone(), trainer, inference.clone());

        Ok(Cofibot {
            config,
            corpus,
            inference,
            admin,
        })
    }

    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.inference.classify(text)
    }

    pub fn respond(&self, text: &str) -> Result<BotResponse> {
        self.inference.respond(text)
    }

    pub fn list_intents(&self) -> Result<Vec<Intent>> {
        self.admin.list_intents()
    }

    pub fn create_intent<P, R>(&self, tag: &str, patterns: P, responses: R) -> Result<CommitResult>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.admin.create_intent(Intent::new(tag, patterns, responses))
    }

    /// Replace the patterns and responses of an existing intent.
    pub fn update_intent<P, R>(&self, tag: &str, patterns: P, responses: R) -> Result<CommitResult>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.admin.update_intent(tag, Intent::new(tag, patterns, responses))
    }

    pub fn delete_intent(&self, tag: &str) -> Result<CommitResult> {
        self.admin.delete_intent(tag)
    }

    pub fn retrain(&self) -> Result<TrainingReport> {
        self.admin.retrain()
    }

    pub fn stats(&self) -> Result<AdminStats> {
        let corpus = self.corpus.load()?.stats();
        let conversations = self.inference.conversations();
        Ok(AdminStats {
            total_intents: corpus.total_intents,
            total_patterns: corpus.total_patterns,
            total_responses: corpus.total_responses,
            total_conversations: conversations.len(),
            intent_usage: conversations.intent_usage(),
            model_accuracy: self.inference.metadata().map(|m| m.accuracy),
        })
    }

    /// The most recent conversation records, oldest first.
    pub fn conversations(&self) -> Vec<ConversationRecord> {
        self.inference
            .conversations()
            .recent(self.config.inference.history_view)
    }

    pub fn health(&self) -> HealthStatus {
        let snapshot = self.inference.snapshot();
        let total_intents = snapshot.as_ref().map_or(0, |loaded| loaded.corpus().len());
        HealthStatus {
            status: if snapshot.is_some() {
                Health::Healthy
            } else {
                Health::Degraded
            },
            model_loaded: snapshot.is_some(),
            intents_loaded: total_intents > 0,
            total_intents,
        }
    }

    pub fn inference(&self) -> &Arc<InferenceService> {
        &self.inference
    }

    pub fn admin(&self) -> &IntentAdmin {
        &self.admin
    }

    pub fn config(&self) -> &CofibotConfig {
        &self.config
    }
}
