//! File-based slot store backend for persistent storage.

use crate::backend::StoreBackend;
use crate::error::{StoreError, StoreResult};
use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file-based slot store backend.
///
/// Each slot is one file under a root directory. Writes go to a temp file
/// that is renamed over the slot file, so a crashed write leaves either the
/// old or the new contents.
///
/// # Thread Safety
///
/// A single mutex serializes writes. The host runtime is effectively
/// single-threaded, so this only guards against accidental overlap.
///
/// # Example
///
/// ```no_run
/// use campsync_store::{FileBackend, StoreBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("queues")).unwrap();
/// backend.write("pos-orders", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Opens a file backend rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the root directory of this backend.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

/// Slot keys become file names, so restrict them to a safe alphabet.
fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl StoreBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.slot_path(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.slot_path(key)?;
        let tmp = self.root.join(format!("{key}.json.tmp"));

        let _guard = self.write_lock.lock();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.slot_path(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
