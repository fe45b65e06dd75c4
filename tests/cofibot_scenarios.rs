mod common;

use std::sync::Arc;

use cofibot::bot::Cofibot;
use cofibot::config::CofibotConfig;
use cofibot::corpus::CorpusStore;
use cofibot::error::{CofibotError, Result};
use cofibot::storage::Storage;
use cofibot::storage::memory::MemoryStorage;

use common::{company_corpus, greeting_farewell, init_logger};

fn trained_bot(document: &cofibot::corpus::CorpusDocument) -> Result<Cofibot> {
    init_logger();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new_default());
    let config = CofibotConfig::default();
    CorpusStore::new(storage.clone(), config.corpus_file.clone()).save(document)?;

    let bot = Cofibot::with_storage(storage, config)?;
    bot.retrain()?;
    Ok(bot)
}

#[test]
fn test_greeting_farewell_example() -> Result<()> {
    let bot = trained_bot(&greeting_farewell())?;

    let result = bot.classify("bonjour")?;
    assert_eq!(result.tag, "greeting");
    assert!(result.confidence >= 0.5);

    let reply = bot.respond("bonjour")?;
    assert_eq!(reply.tag, "greeting");
    assert_eq!(reply.response, "Bonjour !");
    assert!(!reply.is_fallback);

    // Unknown words still yield one of the known tags.
    let result = bot.classify("xyz123")?;
    assert!(result.tag == "greeting" || result.tag == "farewell");
    assert!(result.confidence < 0.6);
    let reply = bot.respond("xyz123")?;
    assert_ne!(reply.tag, "unknown");

    Ok(())
}

#[test]
fn test_duplicate_create_and_missing_delete() -> Result<()> {
    let bot = trained_bot(&greeting_farewell())?;

    let err = bot
        .create_intent("greeting", ["coucou"], ["Coucou !"])
        .unwrap_err();
    assert!(matches!(err, CofibotError::DuplicateTag(_)));

    let err = bot.delete_intent("nonexistent").unwrap_err();
    assert!(matches!(err, CofibotError::NotFound(_)));

    Ok(())
}

#[test]
fn test_training_patterns_beat_chance() -> Result<()> {
    let document = company_corpus();
    let bot = trained_bot(&document)?;
    let chance = 1.0 / document.len() as f64;

    for intent in document.intents() {
        for pattern in &intent.patterns {
            let result = bot.classify(pattern)?;
            assert_eq!(result.tag, intent.tag, "pattern '{pattern}'");
            assert!(
                result.confidence > chance,
                "pattern '{pattern}' confidence {}",
                result.confidence
            );
        }
    }
    Ok(())
}

#[test]
fn test_responses_come_from_the_corpus() -> Result<()> {
    let document = company_corpus();
    let bot = trained_bot(&document)?;

    for text in ["salut", "horaires", "énergie du bâtiment", "zzz", "Bonne journée !"] {
        let reply = bot.respond(text)?;
        let allowed = document.responses_for(&reply.tag).unwrap();
        assert!(allowed.contains(&reply.response));
    }
    Ok(())
}

#[test]
fn test_tag_uniqueness_across_mutations() -> Result<()> {
    let bot = trained_bot(&greeting_farewell())?;

    bot.create_intent("thanks", ["merci", "merci beaucoup"], ["De rien !"])?;
    let _ = bot.create_intent("thanks", ["merci encore"], ["Avec plaisir"]);
    bot.update_intent("greeting", ["bonjour", "coucou"], ["Salut !"])?;
    bot.delete_intent("farewell")?;
    let _ = bot.delete_intent("farewell");
    bot.create_intent("farewell", ["au revoir", "bye"], ["Au revoir !"])?;

    let mut tags: Vec<String> = bot.list_intents()?.into_iter().map(|i| i.tag).collect();
    let total = tags.len();
    tags.sort();
    tags.dedup();
    assert_eq!(tags.len(), total);
    assert_eq!(tags, vec!["farewell", "greeting", "thanks"]);
    Ok(())
}

#[test]
fn test_accents_and_case_are_normalized() -> Result<()> {
    let bot = trained_bot(&company_corpus())?;
    assert_eq!(bot.classify("QUELLE EST LA CONSOMMATION D'ÉNERGIE")?.tag, "consommation");
    assert_eq!(bot.classify("  Horaires du service  ")?.tag, "horaires");
    Ok(())
}
