//! Durable backing file for the record store.
//!
//! The whole store is rewritten on every save: serialized to a temp file in
//! the same directory, fsynced, then renamed over `tokens.json`. Readers of the
//! file never see a partial write.

use crate::error::StoreError;
use crate::record::Store;
use chrono::Local;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// JSON file holding the persisted [`Store`].
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    /// Set when an existing file could not be loaded and could not be moved
    /// aside. Saves are refused while set.
    overwrite_blocked: AtomicBool,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overwrite_blocked: AtomicBool::new(false),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted store.
    ///
    /// Never fails: a missing file yields an empty store, and a file that
    /// cannot be read or parsed is logged and treated as empty. Such a file is
    /// moved aside first; if that fails too, later saves are refused so the
    /// empty store never replaces it.
    pub fn load(&self) -> Store {
        match self.try_load() {
            Ok(Some(store)) => {
                tracing::info!(
                    "Loaded {} token records from {}",
                    store.len(),
                    self.path.display()
                );
                store
            }
            Ok(None) => {
                tracing::info!(
                    "No token store at {}, starting empty",
                    self.path.display()
                );
                Store::new()
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load token store {}: {}",
                    self.path.display(),
                    e
                );
                if !self.quarantine() {
                    self.overwrite_blocked.store(true, Ordering::SeqCst);
                }
                Store::new()
            }
        }
    }

    /// Read the backing file, returning `None` when it does not exist.
    pub fn try_load(&self) -> Result<Option<Store>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write the full store atomically, reporting the failure cause.
    pub fn persist(&self, store: &Store) -> Result<(), StoreError> {
        if self.overwrite_blocked.load(Ordering::SeqCst) {
            return Err(StoreError::Unreadable(self.path.clone()));
        }

        let dir = parent_dir(&self.path);
        fs::create_dir_all(dir)?;

        let mut bytes = serde_json::to_vec_pretty(store)?;
        bytes.push(b'\n');

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        temp.as_file_mut().write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!("Saved token store to {}", self.path.display());
        Ok(())
    }

    /// Write the full store atomically. Returns false on any failure.
    pub fn save(&self, store: &Store) -> bool {
        match self.persist(store) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Failed to save token store {}: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }

    /// Move an unloadable store file to `<name>.corrupt-<timestamp>`.
    fn quarantine(&self) -> bool {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".corrupt-{}", Local::now().format("%Y%m%d%H%M%S")));
        let target = PathBuf::from(name);

        match fs::rename(&self.path, &target) {
            Ok(()) => {
                tracing::warn!("Moved unreadable token store to {}", target.display());
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to move unreadable token store {} aside, saves are disabled: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }
}

/// Directory containing `path`, treating a bare file name as the current directory.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
