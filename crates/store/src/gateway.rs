//! File system persistence for library stores
//!
//! Each aggregate lives in its own JSON file inside the data directory.
//! Writes go to a temporary file in the same directory which is then
//! atomically renamed over the store, so a crash mid-write never leaves a
//! truncated store behind. The previous content is copied to
//! `<store>.backup` before every overwrite. A store that cannot be parsed is
//! moved to `<store>.corrupt` on load so later saves never destroy it.

use crate::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The three durable stores of a library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreName {
    Settings,
    Catalog,
    Ledger,
}

impl StoreName {
    /// All stores, in the order they are saved
    pub const ALL: [StoreName; 3] = [Self::Settings, Self::Catalog, Self::Ledger];

    /// File name of the store inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Settings => "librarysettings.json",
            Self::Catalog => "librarybooks.json",
            Self::Ledger => "borrowedbooks.json",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings => write!(f, "settings"),
            Self::Catalog => write!(f, "catalog"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// Reads and writes named stores in a data directory
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    data_dir: PathBuf,
}

impl PersistenceGateway {
    /// Creates a gateway rooted at `data_dir`
    ///
    /// The directory is created lazily on first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of a store file
    pub fn store_path(&self, store: StoreName) -> PathBuf {
        self.data_dir.join(store.file_name())
    }

    /// Path of the copy kept from before the last overwrite
    pub fn backup_path(&self, store: StoreName) -> PathBuf {
        self.store_path(store).with_extension("json.backup")
    }

    /// Path an unreadable store is moved to on load
    pub fn corrupt_path(&self, store: StoreName) -> PathBuf {
        self.store_path(store).with_extension("json.corrupt")
    }

    /// Saves an aggregate, logging instead of failing
    ///
    /// Returns false if the store could not be written; its previous content
    /// is left as it was.
    pub fn save<T: Serialize>(&self, store: StoreName, aggregate: &T) -> bool {
        match self.try_save(store, aggregate) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Error saving {} store: {}", store, e);
                false
            }
        }
    }

    /// Loads an aggregate, logging instead of failing
    ///
    /// A missing store yields `None` quietly; an unreadable or corrupt store
    /// yields `None` with a warning. Empty or unparseable stores are moved
    /// aside first (see [`Self::corrupt_path`]).
    pub fn load<T: DeserializeOwned>(&self, store: StoreName) -> Option<T> {
        match self.try_load(store) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Error loading {} store: {}", store, e);
                if matches!(e, StoreError::Empty { .. } | StoreError::ParseError { .. }) {
                    match self.quarantine(store) {
                        Ok(target) => log::warn!(
                            "Moved unreadable {} store to {}",
                            store,
                            target.display()
                        ),
                        Err(e) => log::warn!("Could not move unreadable {} store: {}", store, e),
                    }
                }
                None
            }
        }
    }

    /// Saves an aggregate atomically
    pub fn try_save<T: Serialize>(&self, store: StoreName, aggregate: &T) -> StoreResult<()> {
        // Serialize first so a bad aggregate never touches the disk
        let json = serde_json::to_string_pretty(aggregate)?;

        self.ensure_directory_exists()?;

        let path = self.store_path(store);
        if path.exists() {
            self.backup_store(store)?;
        }

        let temp_file = NamedTempFile::new_in(&self.data_dir).map_err(StoreError::IoError)?;
        write_atomic(temp_file, &path, &json)?;

        log::debug!("Saved {} store to {}", store, path.display());
        Ok(())
    }

    /// Loads an aggregate, distinguishing a missing store from a broken one
    pub fn try_load<T: DeserializeOwned>(&self, store: StoreName) -> StoreResult<Option<T>> {
        let path = self.store_path(store);
        if !path.exists() {
            log::info!("{} store not found at {}, using defaults", store, path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        if contents.trim().is_empty() {
            return Err(StoreError::Empty { path });
        }

        let value = serde_json::from_str(&contents)
            .map_err(|e| StoreError::ParseError { path, source: e })?;
        Ok(Some(value))
    }

    fn ensure_directory_exists(&self) -> StoreResult<()> {
        if !self.data_dir.is_dir() {
            fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::DirectoryCreationError {
                path: self.data_dir.clone(),
                source: e,
            })?;
            log::info!("Created data directory: {}", self.data_dir.display());
        }
        Ok(())
    }

    /// Renames the store out of the way, never replacing an earlier copy
    fn quarantine(&self, store: StoreName) -> StoreResult<PathBuf> {
        let path = self.store_path(store);
        let mut target = self.corrupt_path(store);
        let mut attempt = 1;
        while target.exists() {
            target = path.with_extension(format!("json.corrupt.{}", attempt));
            attempt += 1;
        }
        fs::rename(&path, &target).map_err(StoreError::IoError)?;
        Ok(target)
    }

    fn backup_store(&self, store: StoreName) -> StoreResult<()> {
        let backup_path = self.backup_path(store);
        fs::copy(self.store_path(store), &backup_path)
            .map_err(|e| StoreError::BackupError { source: e })?;
        log::debug!("Backed up {} store to {}", store, backup_path.display());
        Ok(())
    }
}

/// Writes content to a temporary file and atomically renames it over `target`
fn write_atomic(mut temp_file: NamedTempFile, target: &Path, content: &str) -> StoreResult<()> {
    temp_file
        .write_all(content.as_bytes())
        .map_err(StoreError::IoError)?;
    temp_file.flush().map_err(StoreError::IoError)?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(StoreError::IoError)?;

    temp_file
        .persist(target)
        .map_err(|e| StoreError::WriteError {
            path: target.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}
