//! Key/value back-ends holding serialized workspace records.

use std::collections::HashMap;

use crate::types::errors::StorageError;

/// String-keyed record store.
pub trait Storage {
    /// Returns the record stored under `key`, or `None` when there is none.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores `value` under `key`, replacing any previous record.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Deletes the record under `key`. Removing a missing record is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Never fails.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    records: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.records.remove(key);
        Ok(())
    }
}

#[cfg(feature = "fs")]
pub use file::FileStorage;

#[cfg(feature = "fs")]
mod file {
    use std::fs::{self, File};
    use std::io::{BufWriter, ErrorKind, Write};
    use std::path::{Path, PathBuf};

    use super::Storage;
    use crate::types::errors::StorageError;

    /// One `<key>.json` file per record inside a directory. The directory is created on the
    /// first write.
    #[derive(Clone, Debug)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            FileStorage { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// File backing `key`.
        pub fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl Storage for FileStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            let path: PathBuf = self.path_for(key);
            match fs::read_to_string(&path) {
                Ok(text) => Ok(Some(text)),
                Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
                Err(source) => Err(StorageError::Read {
                    path: path.display().to_string(),
                    source,
                }),
            }
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDirectory {
                path: self.dir.display().to_string(),
                source,
            })?;

            let path: PathBuf = self.path_for(key);
            let write_err = |source: std::io::Error| StorageError::Write {
                path: path.display().to_string(),
                source,
            };
            let file: File = File::create(&path).map_err(write_err)?;
            let mut writer: BufWriter<File> = BufWriter::new(file);
            writer.write_all(value.as_bytes()).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            let path: PathBuf = self.path_for(key);
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StorageError::Remove {
                    path: path.display().to_string(),
                    source,
                }),
            }
        }
    }
}
