//! File-backed durable store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::instrument;

use super::{CartStore, StoreError};

/// Durable store that keeps each key in its own file under a data directory.
///
/// Writes go to a temporary sibling file which is flushed to disk and then
/// renamed over the target, so an interrupted write leaves the previous
/// snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Map a namespaced key like `trailhead:cart` to a file path.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Write `blob` atomically to `path` via a temporary sibling file.
    fn write_atomic(path: &Path, blob: &str) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(blob.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl CartStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    #[instrument(skip(self, blob), fields(key = %key, bytes = blob.len()))]
    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        Self::write_atomic(&self.path_for(key), blob)
    }
}
