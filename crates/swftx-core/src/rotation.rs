//! Master-password rotation.
//!
//! Rotation is a single transaction that re-encrypts the envelope and
//! every entry secret under a new key generation, then re-establishes the
//! sync session under the new key while preserving the previously issued
//! remote credentials. The local persist (step 5) is the first visible
//! mutation; after it succeeds the rotation is durable regardless of what
//! the remote side does.

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::crypto::{
    Cryptor, DecryptionError, EncryptionError, Envelope, EntryCipher, KdfParams,
    KeyDerivationError,
};
use crate::session::Session;
use crate::storage::StorageError;
use crate::store::VaultStore;
use crate::sync::{RemoteStore, SyncClient, SyncError};

/// The states of one rotation transaction, in order.
///
/// `Failed` is terminal and reachable only from `Verifying`; failures up
/// to `Persisting` surface as errors without a state rollback, and sync
/// failures after the persist are carried in the [`SyncOutcome`] instead,
/// because by then the question is which copy (local vs remote) is
/// authoritative, not whether the rotation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Idle,
    Verifying,
    Decrypting,
    Transforming,
    Encrypting,
    Persisting,
    SyncReinit,
    Done,
    Failed,
}

/// How the post-rotation sync steps went. Reported independently of the
/// rotation's own success: the local vault is already rotated either way,
/// and the caller must be able to tell the user which copy is
/// authoritative.
#[derive(Debug)]
pub enum SyncOutcome {
    /// No remote store configured; nothing to push.
    NotConfigured,
    /// The new blob reached the remote store.
    Pushed,
    /// Re-establishing the sync session under the new key failed before
    /// anything was pushed. The remote store still holds the
    /// pre-rotation blob; local state is authoritative until sync is
    /// repaired.
    ReinitFailed(SyncError),
    /// The push failed; the remote store still holds the pre-rotation
    /// blob. Local state is authoritative until the next successful push.
    PushFailed(SyncError),
}

/// Summary of a completed rotation.
#[derive(Debug)]
pub struct RotationReport {
    /// Number of entries re-keyed (count and order are preserved exactly).
    pub entries: usize,
    pub sync: SyncOutcome,
}

#[derive(Error, Debug)]
pub enum RotationError {
    /// Verification failed; nothing was mutated, locally or remotely.
    #[error("current password is invalid")]
    CurrentPasswordInvalid,

    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    /// The vault failed to decrypt or re-key after verification passed,
    /// which means corruption rather than a wrong password.
    #[error("vault could not be re-keyed: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("vault could not be re-encrypted: {0}")]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Orchestrates one master-password change.
pub struct RotationCoordinator<'a, R> {
    store: &'a VaultStore,
    sync: &'a mut SyncClient<R>,
    state: RotationState,
}

impl<'a, R: RemoteStore> RotationCoordinator<'a, R> {
    pub fn new(store: &'a VaultStore, sync: &'a mut SyncClient<R>) -> Self {
        Self {
            store,
            sync,
            state: RotationState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> RotationState {
        self.state
    }

    fn enter(&mut self, state: RotationState) {
        debug!(?state, "Rotation state");
        self.state = state;
    }

    /// Run the rotation.
    ///
    /// On success the returned [`Session`] carries the new-generation
    /// cryptor and replaces the caller's active session. Only one rotation
    /// or import may be in flight at a time; callers serialize.
    #[instrument(level = "info", skip_all)]
    pub async fn rotate(
        &mut self,
        current_password: SecretString,
        new_password: SecretString,
    ) -> Result<(Session, RotationReport), RotationError> {
        // Verifying: the only state from which rotation aborts without
        // having mutated anything.
        self.enter(RotationState::Verifying);
        let Some(params) = self.store.kdf_params()? else {
            self.enter(RotationState::Failed);
            return Err(RotationError::CurrentPasswordInvalid);
        };
        let current_cryptor = Cryptor::derive_blocking(current_password, params).await?;
        if !self.store.authenticate(&current_cryptor) {
            self.enter(RotationState::Failed);
            return Err(RotationError::CurrentPasswordInvalid);
        }
        let new_cryptor = Cryptor::derive_blocking(new_password, KdfParams::recommended()).await?;

        // Decrypting: entries stay individually protected.
        self.enter(RotationState::Decrypting);
        let encrypted = self.store.read()?;
        let mut vault = current_cryptor.decrypt_data(&encrypted)?;

        // Transforming: re-key every secret, in original order, into a
        // local value. No shared state is touched.
        self.enter(RotationState::Transforming);
        vault.entries = vault
            .entries
            .into_iter()
            .map(|entry| {
                let exposed = current_cryptor.expose(entry)?;
                Ok(new_cryptor.obscure(exposed)?)
            })
            .collect::<Result<Vec<_>, RotationError>>()?;
        let entries = vault.entries.len();

        self.enter(RotationState::Encrypting);
        let new_blob = new_cryptor.encrypt_data(&vault)?;

        // Persisting: first visible mutation. The write is atomic, so a
        // failure here leaves the old blob on disk.
        self.enter(RotationState::Persisting);
        self.store.write(&new_blob)?;
        info!(entries, "Vault re-encrypted under new key generation");

        let sync = if self.sync.is_configured() {
            self.enter(RotationState::SyncReinit);
            // Snapshot the issued credentials before rebinding, then hand
            // them back through ensure_tokens so the provider re-adopts
            // them instead of reissuing. Rotating the master password must
            // never force remote re-authentication.
            let tokens = self.sync.read_tokens();
            // A sync failure past this point must not discard the new
            // session: the local vault is already re-encrypted, so the
            // caller needs the new cryptor no matter what the remote did.
            match self.sync.initialize(&new_cryptor, tokens).await {
                Ok(_) => match self.sync.push(&new_blob).await {
                    Ok(()) => SyncOutcome::Pushed,
                    Err(e) => {
                        warn!(error = %e, "Post-rotation push failed; local vault is authoritative");
                        SyncOutcome::PushFailed(e)
                    }
                },
                Err(e) => {
                    warn!(
                        error = %e,
                        "Sync session could not be re-established after rotation; local vault is authoritative"
                    );
                    SyncOutcome::ReinitFailed(e)
                }
            }
        } else {
            SyncOutcome::NotConfigured
        };

        self.enter(RotationState::Done);
        Ok((
            Session::new(new_cryptor),
            RotationReport { entries, sync },
        ))
    }
}
