//! Load and save of the single user profile.
//!
//! [`ProfileStore::load`] and [`ProfileStore::save`] never report errors:
//! a missing or corrupt record reads as a fresh, empty profile and a failed
//! save leaves the previous record in place. The `try_` variants expose the
//! underlying failures for callers interested in diagnostics.

use thiserror::Error;

use crate::storage::KeyValueStorage;
use crate::{Profile, Result, TrailError, PROFILE_KEY};

/// Why no stored profile could be produced.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no profile has been saved yet")]
    Missing,
    #[error("stored profile is corrupt: {0}")]
    Corrupt(TrailError),
    #[error("storage could not be read: {0}")]
    Unavailable(TrailError),
}

pub struct ProfileStore<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> ProfileStore<S> {
    /// Store the profile under the default [`PROFILE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, PROFILE_KEY)
    }

    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_owned(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read the stored profile, falling back to an empty one
    /// if nothing usable is stored.
    pub fn load(&self) -> Profile {
        match self.try_load() {
            Ok(profile) => profile,
            Err(LoadError::Missing) => {
                log::debug!("{} no stored profile", self.storage.label());
                Profile::default()
            }
            Err(err) => {
                log::warn!(
                    "{} starting from an empty profile: {}",
                    self.storage.label(),
                    err
                );
                Profile::default()
            }
        }
    }

    pub fn try_load(&self) -> std::result::Result<Profile, LoadError> {
        let blob = self
            .storage
            .get(&self.key)
            .map_err(LoadError::Unavailable)?
            .ok_or(LoadError::Missing)?;
        Profile::from_blob(&blob).map_err(LoadError::Corrupt)
    }

    /// Replace the stored profile. Failures are logged and otherwise ignored.
    pub fn save(&mut self, profile: &Profile) {
        if let Err(err) = self.try_save(profile) {
            log::warn!(
                "{} profile was not saved: {}",
                self.storage.label(),
                err
            );
        }
    }

    /// The profile is fully encoded before storage is touched,
    /// so an encoding failure leaves the stored record unchanged.
    pub fn try_save(&mut self, profile: &Profile) -> Result<()> {
        let blob = profile.to_blob()?;
        self.storage.set(&self.key, &blob)?;
        log::info!("{} profile saved under {}", self.storage.label(), self.key);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }
}
