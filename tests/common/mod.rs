#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cofibot::corpus::{CorpusDocument, Intent};
use cofibot::error::{CofibotError, Result};
use cofibot::storage::memory::MemoryStorage;
use cofibot::storage::{Storage, StorageInput, StorageOutput};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn greeting_farewell() -> CorpusDocument {
    CorpusDocument::new(vec![
        Intent::new("greeting", ["bonjour", "salut"], ["Bonjour !"]),
        Intent::new("farewell", ["au revoir", "bye"], ["Au revoir !"]),
    ])
    .unwrap()
}

pub fn company_corpus() -> CorpusDocument {
    CorpusDocument::new(vec![
        Intent::new(
            "greeting",
            ["bonjour", "salut", "coucou", "bonsoir", "hello"],
            ["Bonjour ! Comment puis-je t'aider ?", "Salut !"],
        ),
        Intent::new(
            "farewell",
            ["au revoir", "bye", "à bientôt", "bonne journée", "à plus tard"],
            ["Au revoir !", "À bientôt !"],
        ),
        Intent::new(
            "horaires",
            [
                "quels sont les horaires",
                "horaires d'ouverture",
                "à quelle heure ouvre le bureau",
                "le bureau ferme à quelle heure",
                "horaires du service",
            ],
            ["Le bureau est ouvert de 8h à 17h."],
        ),
        Intent::new(
            "consommation",
            [
                "quelle est la consommation d'énergie",
                "consommation électrique du site",
                "combien d'énergie consommée ce mois",
                "donne moi la consommation",
                "énergie consommée par le bâtiment",
            ],
            ["Je consulte les données de consommation."],
        ),
    ])
    .unwrap()
}

/// Memory storage whose reads or writes of one file can be made to fail.
#[derive(Debug, Clone)]
pub struct FaultyStorage {
    inner: MemoryStorage,
    target: String,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FaultyStorage {
    pub fn new(target: &str) -> Self {
        FaultyStorage {
            inner: MemoryStorage::new_default(),
            target: target.to_string(),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn targets(&self, name: &str) -> bool {
        name.starts_with(&self.target)
    }
}

impl Storage for FaultyStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        if self.targets(name) && self.fail_reads.load(Ordering::SeqCst) {
            return Err(CofibotError::storage(format!("injected read failure: {name}")));
        }
        self.inner.open_input(name)
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        if self.targets(name) && self.fail_writes.load(Ordering::SeqCst) {
            return Err(CofibotError::storage(format!("injected write failure: {name}")));
        }
        self.inner.create_output(name)
    }

    fn file_exists(&self, name: &str) -> bool {
        self.inner.file_exists(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.inner.delete_file(name)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.inner.rename_file(old_name, new_name)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.inner.list_files()
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        self.inner.file_size(name)
    }
}
