//! The unlocked session and the operation facade the UI layer drives.
//!
//! There is no global mutable "active cryptor": a [`Session`] is explicit
//! proof of a successful unlock and is passed by reference into every
//! operation that needs the key. It is created by
//! [`VaultManager::authenticate`] or [`VaultManager::setup`] and simply
//! dropped to lock the vault.

use std::fmt;
use std::path::Path;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};
use zeroize::Zeroizing;

use crate::crypto::{
    Cryptor, DecryptionError, EncryptionError, Envelope, EntryCipher, KeyDerivationError,
    parse_header,
};
use crate::model::{Entry, Vault};
use crate::rotation::{RotationCoordinator, RotationError, RotationReport};
use crate::storage::StorageError;
use crate::store::{ImportError, SetupError, VaultStore};
use crate::sync::{RemoteStore, SyncClient, SyncError, SyncTokens};

/// Proof of a successful unlock, owning the active cryptor.
///
/// Intentionally not `Clone`: there is one active key per unlock, and
/// dropping the session is what locks the vault.
pub struct Session {
    cryptor: Cryptor,
}

impl Session {
    pub(crate) fn new(cryptor: Cryptor) -> Self {
        Self { cryptor }
    }

    #[must_use]
    pub fn cryptor(&self) -> &Cryptor {
        &self.cryptor
    }

    /// Fingerprint of the key generation this session was unlocked under.
    #[must_use]
    pub fn key_id(&self) -> String {
        self.cryptor.key_id()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key_id", &self.key_id())
            .finish()
    }
}

/// Authentication failures other than a wrong password (which is the
/// `Ok(None)` case, not an error).
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),
}

/// Failures reading the decrypted vault for display.
#[derive(Error, Debug)]
pub enum VaultReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),
}

/// Failures persisting an edited vault.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The core's outward surface: everything the UI layer may call.
///
/// Owns the vault store and the sync session; an internal lock serializes
/// the mutating long operations (rotation, import, push, pull) per the
/// one-at-a-time contract. Performs no UI actions itself.
pub struct VaultManager<R> {
    store: VaultStore,
    sync: tokio::sync::Mutex<SyncClient<R>>,
    /// Serializes rotation and import against each other and against sync
    /// traffic. Always taken before the sync client lock.
    op_lock: tokio::sync::Mutex<()>,
}

impl<R: RemoteStore> VaultManager<R> {
    pub fn new(store: VaultStore, provider: R) -> Self {
        Self {
            store,
            sync: tokio::sync::Mutex::new(SyncClient::new(provider)),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    #[must_use]
    pub fn vault_exists(&self) -> bool {
        self.store.vault_exists()
    }

    pub fn is_pristine(&self) -> Result<bool, StorageError> {
        self.store.is_pristine()
    }

    pub async fn sync_configured(&self) -> bool {
        self.sync.lock().await.is_configured()
    }

    /// Create a fresh empty vault under `password` and unlock it.
    #[instrument(level = "info", skip_all)]
    pub async fn setup(&self, password: SecretString) -> Result<Session, SetupFacadeError> {
        let cryptor = Cryptor::derive_blocking(password, crate::crypto::KdfParams::recommended())
            .await?;
        self.store.setup(&cryptor)?;
        Ok(Session::new(cryptor))
    }

    /// Unlock by trial decryption. `Ok(None)` means the password is wrong
    /// (or the vault is pristine); errors are infrastructure failures.
    #[instrument(level = "info", skip_all)]
    pub async fn authenticate(
        &self,
        password: SecretString,
    ) -> Result<Option<Session>, AuthError> {
        let Some(params) = self.store.kdf_params()? else {
            return Ok(None);
        };
        let cryptor = Cryptor::derive_blocking(password, params).await?;
        if self.store.authenticate(&cryptor) {
            info!(key_id = %cryptor.key_id(), "Vault unlocked");
            Ok(Some(Session::new(cryptor)))
        } else {
            warn!("Authentication failed");
            Ok(None)
        }
    }

    /// The decrypted vault for display. Entry secrets remain obscured;
    /// use [`reveal`](Self::reveal) per entry.
    pub fn read(&self, session: &Session) -> Result<Vault, VaultReadError> {
        let blob = self.store.read()?;
        Ok(session.cryptor().decrypt_data(&blob)?)
    }

    /// Decrypt one entry's secret. The plaintext is zeroized on drop.
    pub fn reveal(
        &self,
        session: &Session,
        entry: &Entry,
    ) -> Result<Zeroizing<String>, DecryptionError> {
        let exposed = session.cryptor().expose(entry.clone())?;
        Ok(Zeroizing::new(exposed.secret))
    }

    /// Obscure a plaintext secret for a new or edited entry.
    pub fn protect(&self, session: &Session, entry: Entry) -> Result<Entry, EncryptionError> {
        session.cryptor().obscure(entry)
    }

    /// Encrypt and persist an edited vault. Entry secrets must already be
    /// obscured (see [`protect`](Self::protect)).
    pub fn save(&self, session: &Session, vault: &Vault) -> Result<(), SaveError> {
        let blob = session.cryptor().encrypt_data(vault)?;
        self.store.write(&blob)?;
        Ok(())
    }

    /// Change the master password. Returns the replacement session for the
    /// new key generation alongside the rotation report.
    pub async fn rotate_master_password(
        &self,
        current: SecretString,
        new: SecretString,
    ) -> Result<(Session, RotationReport), RotationError> {
        let _op = self.op_lock.lock().await;
        let mut sync = self.sync.lock().await;
        RotationCoordinator::new(&self.store, &mut sync)
            .rotate(current, new)
            .await
    }

    /// Copy the live encrypted blob to `path` unmodified.
    pub fn export_vault(&self, path: &Path) -> Result<(), StorageError> {
        self.store.export(path)
    }

    /// Restore the vault from a backup file, validated under `password`.
    ///
    /// The trial cryptor is derived from the candidate file's own header,
    /// so backups made under an older master password restore cleanly.
    /// Returns `false` (with the live vault untouched) when the candidate
    /// does not decrypt.
    #[instrument(level = "info", skip(self, password), fields(path = %path.display()))]
    pub async fn import_vault(
        &self,
        path: &Path,
        password: SecretString,
    ) -> Result<bool, ImportFacadeError> {
        let _op = self.op_lock.lock().await;

        let candidate = self.store.read_candidate(path)?;
        let Ok(params) = parse_header(&candidate) else {
            warn!("Import candidate has no recognizable header");
            return Ok(false);
        };
        let cryptor = Cryptor::derive_blocking(password, params).await?;
        match self.store.import(path, &cryptor) {
            Ok(()) => Ok(true),
            Err(ImportError::Rejected) => Ok(false),
            Err(ImportError::Storage(e)) => Err(e.into()),
        }
    }

    /// Establish the sync session for this unlock, preserving any
    /// credentials the provider already holds.
    pub async fn ensure_sync(&self, session: &Session) -> Result<SyncTokens, SyncError> {
        let mut sync = self.sync.lock().await;
        let tokens = sync.read_tokens();
        sync.initialize(session.cryptor(), tokens).await
    }

    /// Upload the current encrypted blob to the remote store.
    pub async fn sync_push(&self) -> Result<(), SyncError> {
        let _op = self.op_lock.lock().await;
        let mut sync = self.sync.lock().await;
        sync.push_current(&self.store).await
    }

    /// Pull the remote vault, replace the local copy, and return the
    /// reconciled vault.
    pub async fn sync_pull(&self, session: &Session) -> Result<Vault, SyncError> {
        let _op = self.op_lock.lock().await;
        let mut sync = self.sync.lock().await;
        sync.perform(&self.store, session.cryptor()).await
    }

    /// Snapshot of the provider's current credentials.
    pub async fn sync_tokens(&self) -> Option<SyncTokens> {
        self.sync.lock().await.read_tokens()
    }
}

/// Setup failures at the facade level.
#[derive(Error, Debug)]
pub enum SetupFacadeError {
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Import failures at the facade level (a rejected candidate is the
/// `Ok(false)` case, not an error).
#[derive(Error, Debug)]
pub enum ImportFacadeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),
}
