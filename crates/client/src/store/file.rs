//! File-backed store: one JSON document per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{KvStore, StoreError};

/// A [`KvStore`] keeping each record as a JSON file in a data directory.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so a crash mid-write leaves the previous record intact rather than a
/// truncated one.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Map a storage key to its file path.
    ///
    /// Keys are restricted to `[A-Za-z0-9:_-]`; the scope separator `:`
    /// becomes `.` on disk (`cart:guest` -> `cart.guest.json`).
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-'))
        {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        let file_name = format!("{}.json", key.replace(':', "."));
        Ok(self.dir.join(file_name))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    key: key.to_owned(),
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_owned(),
                source,
            })
    }

    fn put(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let text = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        let write = |tmp: &Path| -> io::Result<()> {
            fs::write(tmp, text.as_bytes())?;
            fs::rename(tmp, &path)
        };
        write(&tmp).map_err(|source| StoreError::Write {
            key: key.to_owned(),
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                key: key.to_owned(),
                source,
            }),
        }
    }
}
