use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStorage;
use crate::atomic::{self, AtomicFile};
use crate::{Result, TrailError, STORAGE_FOLDER};

/// Represents a folder storage system that persists data to disk.
///
/// Every key lives in its own sub-directory as an [`AtomicFile`],
/// so overwriting one key never exposes a partially written value.
pub struct FolderStorage {
    /// Label for logging
    label: String,
    /// Path to the underlying folder where data is persisted
    root: PathBuf,
}

impl FolderStorage {
    /// Create a new folder storage with a diagnostic label and directory path.
    ///
    /// Existing data under `root` is kept and becomes readable right away.
    pub fn new(label: String, root: &Path) -> Result<Self> {
        if root.exists() && !root.is_dir() {
            return Err(TrailError::Storage(
                label,
                "Path is not a directory".to_owned(),
            ));
        }
        fs::create_dir_all(root)?;
        log::debug!("{} opened at {}", label, root.display());

        Ok(Self {
            label,
            root: PathBuf::from(root),
        })
    }

    /// Open the device-local area inside the application data directory
    /// `app_dir`, which the hosting platform hands to the application.
    pub fn in_app_dir(label: String, app_dir: &Path) -> Result<Self> {
        Self::new(label, &app_dir.join(STORAGE_FOLDER))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove all persisted data, including the root folder itself.
    pub fn erase(self) -> Result<()> {
        fs::remove_dir_all(&self.root).map_err(|err| {
            TrailError::Storage(self.label.clone(), err.to_string())
        })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(TrailError::Storage(
                self.label.clone(),
                format!("Invalid key {:?}", key),
            ));
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueStorage for FolderStorage {
    fn label(&self) -> &str {
        &self.label
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        if !path.is_dir() {
            return Ok(None);
        }

        let latest = AtomicFile::new(path)?.load()?;
        match latest.open()? {
            None => Ok(None),
            Some(_) => Ok(Some(latest.read_content()?)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let file = AtomicFile::new(self.key_path(key)?)?;
        atomic::replace(&file, value)?;

        log::info!(
            "{} {} bytes have been written under {}",
            self.label,
            value.len(),
            key
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if !path.is_dir() {
            return Err(TrailError::Storage(
                self.label.clone(),
                "Key not found".to_owned(),
            ));
        }
        fs::remove_dir_all(&path)?;
        log::info!("{} removed {}", self.label, key);
        Ok(())
    }
}
