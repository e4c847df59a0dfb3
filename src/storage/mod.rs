//! Device-local key-value area.
//!
//! A [`KeyValueStorage`] maps string keys to opaque byte values. Every
//! `set` replaces the whole value under its key, so readers observe either
//! the previous or the new value and never a mix of both.

mod folder;
mod memory;

pub use folder::FolderStorage;
pub use memory::MemoryStorage;

use crate::Result;

pub trait KeyValueStorage {
    /// Diagnostic label used in logs and errors.
    fn label(&self) -> &str;

    /// Read the value stored under `key`.
    /// Returns `Ok(None)` if the key has never been set.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite the value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key`.
    fn remove(&mut self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
