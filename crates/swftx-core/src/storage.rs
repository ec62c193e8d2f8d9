//! Raw persistence of the encrypted blob.
//!
//! Storage moves opaque bytes to and from disk and interprets nothing.
//! Writes are atomic (temp file in the target directory, then rename) so a
//! crash mid-write never corrupts the existing blob.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// I/O failures, with the path that was being touched.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to export to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle on the single backing file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full blob. An absent file reads as empty bytes.
    pub fn read(&self) -> Result<Vec<u8>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Replace the blob atomically.
    ///
    /// The bytes land in a temp file in the same directory, are synced,
    /// and then renamed over the target. The previous blob survives any
    /// failure before the rename.
    pub fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), size = bytes.len(), "Blob written");
        Ok(())
    }

    /// Read candidate bytes from an arbitrary path. The live blob is not
    /// touched; callers validate before overwriting.
    pub fn import(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        fs::read(path).map_err(|source| StorageError::Import {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write bytes to an arbitrary path (backup/export).
    pub fn export(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|source| StorageError::Export {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, bytes).map_err(|source| StorageError::Export {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn absent_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("vault.swftx"));
        assert!(storage.read().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("vault.swftx"));
        storage.write(b"ciphertext").unwrap();
        assert_eq!(storage.read().unwrap(), b"ciphertext");
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("vault.swftx"));
        storage.write(b"first").unwrap();
        storage.write(b"second").unwrap();
        assert_eq!(storage.read().unwrap(), b"second");
    }

    #[test]
    fn write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("nested/deep/vault.swftx"));
        storage.write(b"bytes").unwrap();
        assert_eq!(storage.read().unwrap(), b"bytes");
    }

    #[test]
    fn export_and_import_move_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("vault.swftx"));
        storage.write(b"blob").unwrap();

        let backup = dir.path().join("backup.swftx");
        storage.export(&backup, &storage.read().unwrap()).unwrap();
        assert_eq!(storage.import(&backup).unwrap(), b"blob");
    }

    #[test]
    fn import_of_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("vault.swftx"));
        let result = storage.import(&dir.path().join("nope.swftx"));
        assert!(matches!(result, Err(StorageError::Import { .. })));
    }
}
