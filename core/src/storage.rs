//! File-Backed Persistent String Store
//!
//! The session survives restarts through two small string entries. This
//! module keeps each entry in its own file under a private directory,
//! mirroring a browser's origin-scoped key-value storage: `get` of an
//! absent key is not an error, `remove` of an absent key succeeds, and a
//! `set` replaces the previous value wholesale.
//!
//! Entries can hold a bearer credential, so the directory is created with
//! mode 0o700 and entry files are written with mode 0o600 (unix).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while accessing the store
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage directory could not be created
    #[error("failed to create storage directory {path}: {source}")]
    CreateDir {
        /// The directory that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// An entry could not be read
    #[error("failed to read storage entry '{key}': {source}")]
    Read {
        /// The entry key
        key: String,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// An entry could not be written
    #[error("failed to write storage entry '{key}': {source}")]
    Write {
        /// The entry key
        key: String,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// An entry could not be removed
    #[error("failed to remove storage entry '{key}': {source}")]
    Remove {
        /// The entry key
        key: String,
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// File-backed string store, one file per key.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CreateDir`] if the directory cannot be
    /// created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|e| StorageError::CreateDir {
            path: root.clone(),
            source: e,
        })?;

        // Restrict directory permissions (owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&root, perms).map_err(|e| StorageError::CreateDir {
                path: root.clone(),
                source: e,
            })?;
        }

        Ok(Self { root })
    }

    /// The directory this store lives in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the entry does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] when the entry exists but cannot be
    /// read.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let value = fs::read_to_string(&path).map_err(|e| StorageError::Read {
            key: key.to_string(),
            source: e,
        })?;
        Ok(Some(value))
    }

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the entry cannot be written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);

        let mut file = File::create(&path).map_err(|e| StorageError::Write {
            key: key.to_string(),
            source: e,
        })?;

        // Restrict entry permissions before writing the value
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            file.set_permissions(perms).map_err(|e| StorageError::Write {
                key: key.to_string(),
                source: e,
            })?;
        }

        file.write_all(value.as_bytes())
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                source: e,
            })?;
        file.sync_all().map_err(|e| StorageError::Write {
            key: key.to_string(),
            source: e,
        })?;

        tracing::debug!(key = %key, path = %path.display(), "Storage entry written");
        Ok(())
    }

    /// Remove the entry under `key`.
    ///
    /// Removing an absent entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Remove`] when the entry exists but cannot be
    /// removed.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path).map_err(|e| StorageError::Remove {
            key: key.to_string(),
            source: e,
        })?;

        tracing::debug!(key = %key, path = %path.display(), "Storage entry removed");
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}
