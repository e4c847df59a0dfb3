use std::collections::BTreeMap;

use super::KeyValueStorage;
use crate::{Result, TrailError};

/// Key-value area living only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    label: String,
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new(label: String) -> Self {
        Self {
            label,
            entries: BTreeMap::new(),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn label(&self) -> &str {
        &self.label
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .insert(key.to_owned(), value.to_vec());
        log::debug!("{} {} bytes set under {}", self.label, value.len(), key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key).ok_or_else(|| {
            TrailError::Storage(self.label.clone(), "Key not found".to_owned())
        })?;
        Ok(())
    }
}

impl AsRef<BTreeMap<String, Vec<u8>>> for MemoryStorage {
    fn as_ref(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }
}
