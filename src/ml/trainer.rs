//! Training orchestration: corpus in, persisted model artifact out.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ClassifierConfig, CofibotConfig, TrainerConfig, VectorizerConfig};
use crate::corpus::{CorpusDocument, CorpusStore};
use crate::error::{Result, TrainingError};
use crate::ml::artifact::{ArtifactStore, ModelArtifact, ModelMetadata};
use crate::ml::intent_classifier::{Deadline, IntentModel, IntentSample};
use crate::ml::split::{SplitStrategy, TrainTestSplit, random_split, stratified_split};

/// Outcome of one successful training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Accuracy on the held-out samples, in [0, 1].
    pub accuracy: f64,
    /// Training examples in the corpus (one per pattern).
    pub example_count: usize,
    /// Distinct tags in the corpus.
    pub tag_count: usize,
    pub train_count: usize,
    pub held_out_count: usize,
    pub split: SplitStrategy,
    /// Vocabulary size of the persisted model.
    pub vocabulary_size: usize,
    /// Gradient steps taken by the persisted classifier.
    pub iterations: usize,
    /// Training time in milliseconds.
    pub duration_ms: u64,
    pub model_id: Uuid,
}

/// Fits the intent model from the corpus and persists it.
#[derive(Debug, Clone)]
pub struct Trainer {
    corpus: CorpusStore,
    artifacts: ArtifactStore,
    vectorizer: VectorizerConfig,
    classifier: ClassifierConfig,
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(
        corpus: CorpusStore,
        artifacts: ArtifactStore,
        vectorizer: VectorizerConfig,
        classifier: ClassifierConfig,
        config: TrainerConfig,
    ) -> Self {
        Trainer {
            corpus,
            artifacts,
            vectorizer,
            classifier,
            config,
        }
    }

    /// Build a trainer with every setting taken from `config`.
    pub fn from_config(corpus: CorpusStore, artifacts: ArtifactStore, config: &CofibotConfig) -> Self {
        Trainer::new(
            corpus,
            artifacts,
            config.vectorizer.clone(),
            config.classifier.clone(),
            config.trainer.clone(),
        )
    }

    /// Load the corpus, fit, and atomically persist the artifact.
    ///
    /// On any failure the previously persisted artifact is left untouched.
    pub fn run(&self) -> Result<TrainingReport> {
        let document = self.corpus.load()?;
        let (artifact, report) = self.train(&document)?;
        self.artifacts.save(&artifact)?;

        info!(
            "Trained model {}: {} examples, {} tags, {} split, accuracy {:.3}, {} terms, {} ms",
            report.model_id,
            report.example_count,
            report.tag_count,
            report.split,
            report.accuracy,
            report.vocabulary_size,
            report.duration_ms
        );
        Ok(report)
    }

    /// Fit a model for `document` without persisting anything.
    ///
    /// The reported accuracy never gates the result.
    pub fn train(&self, document: &CorpusDocument) -> Result<(ModelArtifact, TrainingReport)> {
        let started = Instant::now();
        let deadline = self.config.timeout().map(Deadline::after);

        let samples = document.training_samples();
        if samples.is_empty() {
            return Err(TrainingError::EmptyCorpus.into());
        }
        let tag_count = samples
            .iter()
            .map(|s| s.tag.as_str())
            .collect::<HashSet<_>>()
            .len();
        if tag_count < 2 {
            return Err(TrainingError::TooFewTags { actual: tag_count }.into());
        }

        let split = self.split(&samples)?;
        let evaluated = IntentModel::fit(
            &split.train,
            &self.vectorizer,
            &self.classifier,
            deadline.as_ref(),
        )?;
        let accuracy = evaluate(&evaluated, &split.held_out)?;

        let model = if self.config.refit_on_full_corpus
            && split.strategy != SplitStrategy::Resubstitution
        {
            IntentModel::fit(&samples, &self.vectorizer, &self.classifier, deadline.as_ref())?
        } else {
            evaluated
        };

        let metadata = ModelMetadata {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            example_count: samples.len(),
            tag_count,
            accuracy,
            vocabulary_size: model.vectorizer().vocabulary_size(),
            split: split.strategy,
        };
        let report = TrainingReport {
            accuracy,
            example_count: samples.len(),
            tag_count,
            train_count: split.train.len(),
            held_out_count: split.held_out.len(),
            split: split.strategy,
            vocabulary_size: metadata.vocabulary_size,
            iterations: model.classifier().iterations(),
            duration_ms: started.elapsed().as_millis() as u64,
            model_id: metadata.model_id,
        };

        Ok((ModelArtifact { metadata, model }, report))
    }

    fn split(&self, samples: &[IntentSample]) -> Result<TrainTestSplit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let split = match stratified_split(samples, self.config.test_ratio, &mut rng) {
            Ok(split) => split,
            Err(TrainingError::InsufficientData {
                tag,
                min_per_class,
                actual,
            }) => {
                warn!(
                    "Tag '{tag}' has {actual} example(s), fewer than the {min_per_class} a stratified split needs; using a random split"
                );
                random_split(samples, self.config.test_ratio, &mut rng)
            }
            Err(e) => return Err(e.into()),
        };

        if split.held_out.is_empty() || split.train_tag_count() < 2 {
            warn!(
                "The {} split leaves fewer than 2 tags to train on; evaluating on the training data",
                split.strategy
            );
            return Ok(TrainTestSplit::resubstitution(samples));
        }
        Ok(split)
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}

/// Fraction of samples whose predicted tag matches.
fn evaluate(model: &IntentModel, samples: &[IntentSample]) -> Result<f64> {
    if samples.is_empty() {
        return Ok(0.0);
    }
    let correct = samples
        .par_iter()
        .map(|sample| Ok(usize::from(model.predict(&sample.text)?.tag == sample.tag)))
        .collect::<Result<Vec<usize>>>()?
        .into_iter()
        .sum::<usize>();
    Ok(correct as f64 / samples.len() as f64)
}
