//! The persisted output of one training run.
//!
//! An artifact file is a fixed header followed by a bincode payload:
//!
//! | bytes | content                        |
//! |-------|--------------------------------|
//! | 4     | magic `CFBM`                   |
//! | 4     | format version (`u32` LE)      |
//! | 4     | CRC-32 of the payload (`u32` LE) |
//! | 8     | payload length (`u64` LE)      |
//! | n     | bincode [`ModelArtifact`]      |
//!
//! Artifacts are only ever replaced wholesale through
//! [`write_atomic`](crate::storage::write_atomic).

use std::io::{Cursor, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CofibotError, Result};
use crate::ml::intent_classifier::IntentModel;
use crate::ml::split::SplitStrategy;
use crate::storage::{Storage, read_all, write_atomic};

/// File signature of a model artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"CFBM";

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Model metadata for tracking model information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Identifier of the training run.
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    /// Training examples in the corpus.
    pub example_count: usize,
    /// Distinct tags in the corpus.
    pub tag_count: usize,
    /// Held-out accuracy in [0, 1].
    pub accuracy: f64,
    pub vocabulary_size: usize,
    /// How the accuracy was measured.
    pub split: SplitStrategy,
}

/// A fitted model with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub model: IntentModel,
}

impl ModelArtifact {
    /// Encode with header and checksum.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| CofibotError::serialization(format!("failed to encode model: {e}")))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.write_all(&ARTIFACT_MAGIC)?;
        bytes.write_u32::<LittleEndian>(ARTIFACT_VERSION)?;
        bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode and verify an encoded artifact.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CofibotError::serialization(format!(
                "model artifact too short: {} bytes",
                bytes.len()
            )));
        }
        if bytes[..4] != ARTIFACT_MAGIC {
            return Err(CofibotError::serialization("not a model artifact"));
        }

        let mut header = Cursor::new(&bytes[4..HEADER_LEN]);
        let version = header.read_u32::<LittleEndian>()?;
        let checksum = header.read_u32::<LittleEndian>()?;
        let length = header.read_u64::<LittleEndian>()?;

        if version != ARTIFACT_VERSION {
            return Err(CofibotError::serialization(format!(
                "unsupported model artifact version {version}"
            )));
        }

        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u64 != length {
            return Err(CofibotError::serialization(format!(
                "model artifact truncated: expected {length} payload bytes, found {}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != checksum {
            return Err(CofibotError::serialization("model artifact checksum mismatch"));
        }

        bincode::deserialize(payload)
            .map_err(|e| CofibotError::serialization(format!("failed to decode model: {e}")))
    }
}

/// Persists one [`ModelArtifact`] under a fixed file name.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    storage: Arc<dyn Storage>,
    file_name: String,
}

impl ArtifactStore {
    pub fn new<S: Into<String>>(storage: Arc<dyn Storage>, file_name: S) -> Self {
        ArtifactStore {
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

    pub fn load(&self) -> Result<ModelArtifact> {
        let bytes = read_all(self.storage.as_ref(), &self.file_name)?;
        ModelArtifact::decode(&bytes)
    }

    /// Encode fully, then swap the file in with a rename.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        let bytes = artifact.encode()?;
        write_atomic(self.storage.as_ref(), &self.file_name, &bytes)?;
        info!(
            "Saved model {} to '{}' ({} bytes)",
            artifact.metadata.model_id,
            self.file_name,
            bytes.len()
        );
        Ok(())
    }
}
