//! Load and save the corpus document through a [`Storage`] backend.

use std::sync::Arc;

use log::{debug, info};

use crate::corpus::CorpusDocument;
use crate::error::Result;
use crate::storage::{Storage, read_all, write_atomic};

/// Persists one [`CorpusDocument`] under a fixed file name.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    storage: Arc<dyn Storage>,
    file_name: String,
}

impl CorpusStore {
    pub fn new<S: Into<String>>(storage: Arc<dyn Storage>, file_name: S) -> Self {
        CorpusStore {
            storage,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn exists(&self) -> bool {
        self.storage.file_exists(&self.file_name)
    }

    /// Read and validate the persisted document.
    ///
    /// A missing or unreadable file is a storage error; malformed content is a
    /// JSON or validation error.
    pub fn load(&self) -> Result<CorpusDocument> {
        let bytes = read_all(self.storage.as_ref(), &self.file_name)?;
        let document = CorpusDocument::from_json(&bytes)?;
        debug!(
            "Loaded corpus '{}' with {} intents",
            self.file_name,
            document.len()
        );
        Ok(document)
    }

    /// Validate and atomically replace the persisted document.
    pub fn save(&self, document: &CorpusDocument) -> Result<()> {
        document.validate()?;
        let bytes = document.to_json_pretty()?;
        write_atomic(self.storage.as_ref(), &self.file_name, &bytes)?;
        info!(
            "Saved corpus '{}' ({} intents, {} bytes)",
            self.file_name,
            document.len(),
            bytes.len()
        );
        Ok(())
    }
}
