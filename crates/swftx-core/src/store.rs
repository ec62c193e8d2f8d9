//! Vault-level operations over [`Storage`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::crypto::{Cryptor, EncryptionError, Envelope, KdfParams, parse_header};
use crate::model::Vault;
use crate::storage::{Storage, StorageError};

/// First-time vault creation failures.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Import failures. A rejected candidate never touches the live vault.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The candidate file did not decrypt under the supplied cryptor.
    #[error("import candidate failed to decrypt; live vault left untouched")]
    Rejected,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owner of the on-disk encrypted blob.
///
/// All reads and writes of the live vault go through this type. Writes are
/// additionally serialized by an internal lock; higher layers serialize
/// whole operations (rotation, import) on top of it.
#[derive(Debug)]
pub struct VaultStore {
    storage: Storage,
    write_lock: Mutex<()>,
}

impl VaultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::new(path),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// True iff the backing file exists and is non-empty.
    #[must_use]
    pub fn vault_exists(&self) -> bool {
        std::fs::metadata(self.storage.path())
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    /// True iff the backing file is absent or empty (fresh install).
    pub fn is_pristine(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    /// Trial-decryption authentication: the password is right iff the live
    /// blob decrypts under `cryptor`. There is no stored hash; nothing
    /// beyond the blob itself backs this check.
    #[must_use]
    pub fn authenticate(&self, cryptor: &Cryptor) -> bool {
        match self.read() {
            Ok(blob) => Self::is_decryptable(&blob, cryptor),
            Err(e) => {
                warn!(error = %e, "Authentication read failed");
                false
            }
        }
    }

    /// Whether `data` decrypts to a well-formed vault under `cryptor`.
    #[must_use]
    pub fn is_decryptable(data: &[u8], cryptor: &Cryptor) -> bool {
        match cryptor.decrypt_data(data) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Blob not decryptable under supplied key");
                false
            }
        }
    }

    /// Create a fresh, empty, encrypted vault.
    pub fn setup(&self, cryptor: &Cryptor) -> Result<(), SetupError> {
        let blob = cryptor.encrypt_data(&Vault::empty())?;
        self.write(&blob)?;
        info!(path = %self.path().display(), "Vault initialized");
        Ok(())
    }

    /// Parse the KDF parameters out of the live blob's header, if there is
    /// a parseable blob at all. `None` covers both the pristine vault and
    /// unrecognizable content; trial decryption of the latter would fail
    /// anyway.
    pub fn kdf_params(&self) -> Result<Option<KdfParams>, StorageError> {
        let blob = self.read()?;
        Ok(parse_header(&blob).ok())
    }

    pub fn read(&self) -> Result<Vec<u8>, StorageError> {
        self.storage.read()
    }

    pub fn write(&self, blob: &[u8]) -> Result<(), StorageError> {
        // A poisoned lock means a panic elsewhere, not a torn write (the
        // write itself is atomic); recover the guard and carry on.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.storage.write(blob)
    }

    /// Read candidate bytes from `path` without touching the live vault.
    pub fn read_candidate(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.storage.import(path)
    }

    /// Replace the live vault with the file at `path`, but only if it
    /// decrypts under `cryptor`. All-or-nothing: a rejected candidate
    /// leaves the live blob byte-for-byte unchanged.
    pub fn import(&self, path: &Path, cryptor: &Cryptor) -> Result<(), ImportError> {
        let candidate = self.storage.import(path)?;
        if !Self::is_decryptable(&candidate, cryptor) {
            warn!(path = %path.display(), "Import candidate rejected");
            return Err(ImportError::Rejected);
        }
        self.write(&candidate)?;
        info!(path = %path.display(), "Vault imported");
        Ok(())
    }

    /// Copy the live encrypted blob to `path` unmodified. The export is
    /// byte-for-byte re-importable.
    pub fn export(&self, path: &Path) -> Result<(), StorageError> {
        let blob = self.read()?;
        self.storage.export(path, &blob)?;
        info!(path = %path.display(), "Vault exported");
        Ok(())
    }
}
