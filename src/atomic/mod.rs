mod file;

use std::io::{ErrorKind, Result, Write};

pub use file::{AtomicFile, ReadOnlyFile, TmpFile};

/// Publish `data` as the next version of `atomic_file`.
///
/// The previous content is never read. If another writer publishes a
/// version in between, the write is attempted again on top of it, so
/// the last writer to succeed wins.
pub fn replace(atomic_file: &AtomicFile, data: &[u8]) -> Result<()> {
    loop {
        let latest = atomic_file.load()?;
        let tmp = atomic_file.make_temp()?;
        (&tmp).write_all(data)?;
        (&tmp).flush()?;
        match atomic_file.compare_and_swap(&latest, tmp) {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                log::debug!(
                    "version {} of {} was superseded, retrying",
                    latest.version + 1,
                    atomic_file.directory.display()
                );
            }
            Err(err) => return Err(err),
        }
    }
}
