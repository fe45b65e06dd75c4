use std::hint::black_box;
use std::sync::Arc;

use cofibot::config::{ClassifierConfig, CofibotConfig, VectorizerConfig};
use cofibot::corpus::{CorpusDocument, CorpusStore, Intent};
use cofibot::inference::InferenceService;
use cofibot::ml::{ArtifactStore, IntentModel, Trainer};
use cofibot::storage::memory::MemoryStorage;
use criterion::{Criterion, criterion_group, criterion_main};

fn generate_corpus(intents: usize, patterns: usize) -> CorpusDocument {
    let words = [
        "énergie", "consommation", "bureau", "horaires", "facture", "site", "mois", "semaine",
        "réunion", "contrat", "salle", "badge", "parking", "accès", "projet", "rapport",
    ];
    let intents = (0..intents)
        .map(|i| {
            let patterns: Vec<String> = (0..patterns)
                .map(|j| {
                    format!(
                        "{} {} {} sujet{i}",
                        words[(i + j) % words.len()],
                        words[(i * 3 + j) % words.len()],
                        words[(i * 7 + j * 5) % words.len()]
                    )
                })
                .collect();
            Intent::new(format!("intent{i}"), patterns, [format!("réponse {i}")])
        })
        .collect();
    CorpusDocument::new(intents).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let samples = generate_corpus(20, 10).training_samples();
    let mut group = c.benchmark_group("training");
    group.sample_size(10);
    group.bench_function("fit_200_examples", |b| {
        b.iter(|| {
            IntentModel::fit(
                black_box(&samples),
                &VectorizerConfig::default(),
                &ClassifierConfig::default(),
                None,
            )
            .unwrap()
        })
    });
    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let storage = Arc::new(MemoryStorage::new_default());
    let config = CofibotConfig::default();
    let corpus = CorpusStore::new(storage.clone(), "intents.json");
    let artifacts = ArtifactStore::new(storage, "model.bin");
    corpus.save(&generate_corpus(20, 10)).unwrap();
    Trainer::from_config(corpus.clone(), artifacts.clone(), &config)
        .run()
        .unwrap();
    let service = InferenceService::new(corpus, artifacts, config.inference);
    service.reload().unwrap();

    let queries = [
        "quelle est la consommation du site ce mois",
        "horaires du bureau",
        "badge parking accès",
        "xyz123",
    ];

    let mut group = c.benchmark_group("inference");
    group.bench_function("classify", |b| {
        b.iter(|| {
            for query in &queries {
                let _ = black_box(service.classify(black_box(query)).unwrap());
            }
        })
    });
    group.bench_function("reload", |b| b.iter(|| service.reload().unwrap()));
    group.finish();
}

criterion_group!(benches, bench_training, bench_inference);
criterion_main!(benches);
