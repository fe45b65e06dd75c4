//! Storage abstraction for the corpus document and the model artifact.
//!
//! Both persisted files go through the [`Storage`] trait so the engine can run
//! against the file system in production and against memory in tests.
//!
//! # Storage Types
//!
//! - [`FileStorage`](file::FileStorage) - files in a directory
//! - [`MemoryStorage`](memory::MemoryStorage) - in-process map, non-persistent
//!
//! Writers never overwrite a file in place: [`write_atomic`] writes a unique
//! temporary file, syncs it, then renames it over the target, so a concurrent
//! reader sees either the old bytes or the new bytes.
//!
//! # Example
//!
//! ```
//! use cofibot::storage::memory::MemoryStorage;
//! use cofibot::storage::{read_all, write_atomic};
//!
//! # fn main() -> cofibot::error::Result<()> {
//! let storage = MemoryStorage::new_default();
//! write_atomic(&storage, "intents.json", br#"{"intents":[]}"#)?;
//! assert_eq!(read_all(&storage, "intents.json")?, br#"{"intents":[]}"#);
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

use crate::error::Result;

pub mod file;
pub mod memory;

/// A trait for storage backends that can store and retrieve named files.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open an existing file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create (or truncate) a file for writing.
    ///
    /// Contents become visible under `name` once the output is closed.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Rename a file, replacing `new_name` if it exists.
    ///
    /// The replacement must be atomic: readers of `new_name` observe either
    /// the previous contents or the renamed file, never a mix.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// List all files in the storage, sorted by name.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the size of the input stream.
    fn size(&self) -> Result<u64>;

    /// Close the input stream.
    fn close(&mut self) -> Result<()>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush buffered data and sync it to the backing medium.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Close the output stream, publishing its contents.
    fn close(&mut self) -> Result<()>;
}

/// Configuration for storage backends.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Buffer size for I/O operations.
    pub buffer_size: usize,

    /// Whether closing an output also fsyncs it.
    pub sync_on_close: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            buffer_size: 64 * 1024,
            sync_on_close: true,
        }
    }
}

/// Error types specific to storage operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<StorageError> for crate::error::CofibotError {
    fn from(err: StorageError) -> Self {
        crate::error::CofibotError::storage(err.to_string())
    }
}

/// Read a whole file into memory.
pub fn read_all(storage: &dyn Storage, name: &str) -> Result<Vec<u8>> {
    let mut input = storage.open_input(name)?;
    let mut buffer = Vec::with_capacity(input.size()? as usize);
    input.read_to_end(&mut buffer)?;
    input.close()?;
    Ok(buffer)
}

/// Replace `name` with `bytes` via a temporary file and a rename.
///
/// On failure the temporary file is removed and `name` is left untouched.
pub fn write_atomic(storage: &dyn Storage, name: &str, bytes: &[u8]) -> Result<()> {
    let tmp_name = format!("{name}.{}.tmp", uuid::Uuid::new_v4().simple());

    let written = (|| -> Result<()> {
        let mut output = storage.create_output(&tmp_name)?;
        output.write_all(bytes)?;
        output.flush_and_sync()?;
        output.close()?;
        storage.rename_file(&tmp_name, name)
    })();

    if written.is_err() && storage.file_exists(&tmp_name) {
        let _ = storage.delete_file(&tmp_name);
    }
    written
}
