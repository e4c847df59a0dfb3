use std::fs::{self, File};
use std::io::{Error, ErrorKind, Read, Result, Write};
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

const MAX_VERSION_FILES: usize = 10;

pub struct TmpFile {
    file: File,
    path: PathBuf,
}

impl TmpFile {
    pub fn create_in(temp_dir: impl AsRef<Path>) -> Result<Self> {
        let filename: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        let path = temp_dir.as_ref().join(filename);
        let file = File::create(&path)?;
        Ok(Self { file, path })
    }
}

impl Write for &TmpFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (&self.file).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (&self.file).flush()
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// A snapshot of one version of an [`AtomicFile`].
#[derive(Clone, Debug)]
pub struct ReadOnlyFile {
    pub version: usize,
    pub path: PathBuf,
}

impl ReadOnlyFile {
    /// Open the underlying file, which can be read from but not written to.
    /// May return `Ok(None)`, which means that no version
    /// of the `AtomicFile` has been created yet.
    pub fn open(&self) -> Result<Option<File>> {
        if self.version != 0 {
            Ok(Some(File::open(&self.path)?))
        } else {
            Ok(None)
        }
    }

    pub fn read_to_string(&self) -> Result<String> {
        match self.open()? {
            None => Err(Error::new(ErrorKind::NotFound, "File not found")),
            Some(mut file) => {
                let mut buf = String::new();
                file.read_to_string(&mut buf)?;
                Ok(buf)
            }
        }
    }

    pub fn read_content(&self) -> Result<Vec<u8>> {
        match self.open()? {
            None => Err(Error::new(ErrorKind::NotFound, "File not found")),
            Some(mut file) => {
                let mut buf = vec![];
                file.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// A logical file kept as a directory of numbered versions.
///
/// Writers never touch an existing version: new content goes to a
/// temporary file which is then hard-linked as the next version.
/// Readers always see a complete version.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AtomicFile {
    pub directory: PathBuf,
    pub prefix: String,
}

fn parse_version(filename: Option<&str>) -> Option<usize> {
    let (_, version) = filename?.rsplit_once('.')?;
    version.parse().ok()
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let directory = path.into();
        let filename = match directory.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_owned(),
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                "`path` must specify a directory name",
            ))?,
        };

        fs::create_dir_all(&directory)?;
        let prefix = format!("{}.", filename);
        Ok(Self { directory, prefix })
    }

    /// Return the latest version together with the files
    /// carrying this version.
    pub fn latest_version(&self) -> Result<(usize, Vec<ReadOnlyFile>)> {
        let (files, version) = fs::read_dir(&self.directory)?
            .flatten()
            .fold((vec![], 0), |(mut files, mut current_max), entry| {
                let filename = entry.file_name();
                if let Some(version) = parse_version(filename.to_str()) {
                    if version >= current_max {
                        files.push(ReadOnlyFile {
                            version,
                            path: entry.path(),
                        });
                        current_max = version;
                    }
                }
                (files, current_max)
            });
        let files = files
            .into_iter()
            .filter(|file| file.version == version)
            .collect();
        Ok((version, files))
    }

    pub fn path(&self, version: usize) -> PathBuf {
        self.directory
            .join(format!("{}{version}", self.prefix))
    }

    pub fn load(&self) -> Result<ReadOnlyFile> {
        let (version, mut files) = self.latest_version()?;
        let file = match files.pop() {
            Some(file) => file,
            None => ReadOnlyFile {
                version,
                path: self.path(version),
            },
        };
        Ok(file)
    }

    pub fn make_temp(&self) -> Result<TmpFile> {
        TmpFile::create_in(&self.directory)
    }

    /// Replace the contents of the file with the contents of `new` if the
    /// latest version is the same as `current`.
    ///
    /// # Errors
    /// If `io::ErrorKind::AlreadyExists` is returned, it means that the latest
    /// version was not the same as `current` and the operation must be retried
    /// with a fresher version of the file. Any other I/O error is forwarded as
    /// well.
    pub fn compare_and_swap(
        &self,
        current: &ReadOnlyFile,
        new: TmpFile,
    ) -> Result<()> {
        let new_path = self.path(current.version + 1);
        new.file.sync_data()?;
        let (latest_version, _) = self.latest_version()?;
        if latest_version > current.version {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                "the `current` file is not the latest version",
            ));
        }
        // May return `EEXIST` when another writer won the race.
        if let Err(err) = fs::hard_link(&new.path, new_path) {
            // A link count of 2 means the link did happen
            // even though the call reported an error.
            #[cfg(unix)]
            if new.path.metadata()?.nlink() != 2 {
                return Err(err);
            }
            #[cfg(not(unix))]
            return Err(err);
        }

        let number_of_removed = self.prune_old_versions(current.version + 1);
        log::debug!("pruned {} old files", number_of_removed);
        Ok(())
    }

    /// Return the number of files deleted
    fn prune_old_versions(&self, version: usize) -> usize {
        let mut deleted = 0;
        if let Ok(iterator) = fs::read_dir(&self.directory) {
            for entry in iterator.flatten() {
                if let Some(file_version) =
                    parse_version(entry.file_name().to_str())
                {
                    if file_version + MAX_VERSION_FILES <= version
                        && fs::remove_file(entry.path()).is_ok()
                    {
                        deleted += 1;
                    }
                }
            }
        }
        deleted
    }
}

#[cfg(test)]
mod tests {
    use crate::initialize;

    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempdir::TempDir;

    fn write_version(file: &AtomicFile, content: &str) {
        let temp = file.make_temp().unwrap();
        let current = file.load().unwrap();
        (&temp).write_all(content.as_bytes()).unwrap();
        file.compare_and_swap(&current, temp).unwrap();
    }

    #[test]
    fn never_written_file_has_no_content() {
        initialize();
        let dir = TempDir::new("never_written").unwrap();
        let file = AtomicFile::new(dir.path().join("profile")).unwrap();

        let latest = file.load().unwrap();
        assert_eq!(latest.version, 0);
        assert!(latest.open().unwrap().is_none());
        assert_eq!(
            latest.read_content().unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn rejects_path_without_name() {
        let err = AtomicFile::new("/").unwrap_err();
        assert!(matches!(err, crate::TrailError::Io(_)));
    }

    #[test]
    fn delete_old_files() {
        initialize();
        let dir = TempDir::new("max_files").unwrap();
        let root = dir.path();
        let file = AtomicFile::new(root).unwrap();
        let number_of_version = 20;
        assert!(number_of_version > MAX_VERSION_FILES);
        for i in 0..number_of_version {
            write_version(&file, &format!("Version {}", i + 1));
        }

        let version_files = fs::read_dir(root).unwrap().count();
        assert_eq!(version_files, MAX_VERSION_FILES);
        let latest = file.load().unwrap();
        assert_eq!(latest.version, number_of_version);
        assert_eq!(latest.read_to_string().unwrap(), "Version 20");
    }

    #[test]
    fn stale_snapshot_is_rejected() {
        initialize();
        let dir = TempDir::new("stale_snapshot").unwrap();
        let file = AtomicFile::new(dir.path()).unwrap();

        let stale = file.load().unwrap();
        write_version(&file, "fresh");

        let temp = file.make_temp().unwrap();
        (&temp).write_all(b"stale").unwrap();
        let err = file.compare_and_swap(&stale, temp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            file.load().unwrap().read_to_string().unwrap(),
            "fresh"
        );
    }

    #[rstest]
    #[case(1, "case_1")]
    #[case(3, "case_2")]
    #[case(10, "case_3")]
    #[case(15, "case_4")]
    fn latest_version(#[case] versions: usize, #[case] temp_name: &str) {
        initialize();

        let dir = TempDir::new(temp_name).unwrap();
        let root = dir.path();
        let file = AtomicFile::new(root).unwrap();
        for version in 0..versions {
            let file_path = root.join(format!("{}{}", file.prefix, version + 1));
            let mut raw = File::create(file_path).unwrap();
            raw.write_all(format!("Version {}", version + 1).as_bytes())
                .unwrap();
        }
        // Files without a numeric suffix are not versions
        File::create(root.join("notes.txt")).unwrap();
        File::create(root.join("scratch")).unwrap();

        assert_eq!(file.latest_version().unwrap().0, versions);
        let latest = file.load().unwrap();
        assert_eq!(
            latest.read_to_string().unwrap(),
            format!("Version {}", versions)
        );
    }
}
