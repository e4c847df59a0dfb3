pub mod atomic;
mod errors;
pub mod flow;
pub mod photo;
pub mod profile;
pub mod storage;
pub mod store;

pub use errors::{Result, TrailError};
pub use profile::Profile;
pub use store::{LoadError, ProfileStore};

/// Key under which the single user profile is persisted.
pub const PROFILE_KEY: &str = "UserProfile";

/// Folder, relative to the application data directory,
/// holding the device-local key-value area.
/// See [`storage::FolderStorage::in_app_dir`].
pub const STORAGE_FOLDER: &str = ".trailing-ahead";

/// Lossy compression factor applied to profile photos, on a 0 to 1 scale.
pub const PHOTO_QUALITY: f32 = 0.8;

#[cfg(test)]
pub(crate) fn initialize() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}
