//! Durable local key-value store.
//!
//! The persistence medium behind the session: survives reloads, keyed by
//! strings like `session`, `cart:<scope>`, `wishlist:<scope>`. All session
//! state goes through the [`KvStore`] trait; nothing else writes the
//! persisted records.
//!
//! Store failures are second-class by design: a failed write means "this
//! mutation will not survive a reload", never "this mutation failed". The
//! managers log and carry on.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the record failed at the I/O layer.
    #[error("failed to read record `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the record failed (disk full, permissions, ...).
    #[error("failed to write record `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes are not the expected JSON shape. Callers treat this
    /// as "record absent" after logging - stale state must not wedge the
    /// session.
    #[error("record `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be serialized for writing.
    #[error("failed to encode record `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters the store cannot represent.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// A durable string-keyed JSON store.
pub trait KvStore: Send + Sync {
    /// Read the raw JSON value under `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// I/O failures and corrupt records.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write the raw JSON value under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// I/O failures.
    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;

    /// Delete the record under `key`. Deleting an absent key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// I/O failures.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read and decode a typed record.
    ///
    /// # Errors
    ///
    /// I/O failures; a record that does not decode is
    /// [`StoreError::Corrupt`].
    fn get_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_owned(),
                    source,
                }),
        }
    }

    /// Encode and write a typed record.
    ///
    /// # Errors
    ///
    /// Encoding and I/O failures.
    fn put_record<T: Serialize>(&self, key: &str, record: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(record).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.put(key, &value)
    }
}
