//! Remote-store synchronization.
//!
//! The remote store is an external collaborator, specified only at its
//! boundary: the [`RemoteStore`] trait. The credential material
//! ([`SyncTokens`]) is deliberately independent of the vault encryption
//! key, so changing the master password never forces remote
//! re-authentication.

pub mod client;
pub mod folder;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{Cryptor, DecryptionError};
use crate::storage::StorageError;

pub use client::SyncClient;
pub use folder::FolderRemote;

/// Push/pull failures. A failed sync operation never mutates local state.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("remote store is not configured")]
    NotConfigured,

    #[error("remote store rejected the sync credentials")]
    Unauthorized,

    #[error("remote store holds no vault blob")]
    RemoteEmpty,

    /// The pulled blob did not decrypt under the active key. Local and
    /// remote have diverged (e.g. a rotation on another device).
    #[error("remote vault could not be decrypted under the active key: {0}")]
    RemoteUndecryptable(#[source] DecryptionError),

    #[error("remote transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("remote response is malformed: {0}")]
    Malformed(String),

    /// Writing a pulled blob to the local vault failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Remote-store credentials, issued once by the provider on first
/// configuration and preserved verbatim across master-password rotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SyncTokens {
    /// Issue a fresh credential pair. Providers backed by a real service
    /// would receive these from the service instead.
    #[must_use]
    pub fn issue() -> Self {
        use rand::RngCore;
        let mut raw = [0u8; 32];
        rand::rng().fill_bytes(&mut raw);
        Self {
            access_token: hex::encode(&raw[..16]),
            refresh_token: hex::encode(&raw[16..]),
        }
    }
}

/// The provider boundary.
///
/// Session establishment is a two-phase protocol: [`bind_key`] is a pure
/// local rebind of the provider's key reference (no network), and
/// [`ensure_tokens`] idempotently establishes credentials, issuing fresh
/// ones only when the caller supplies none. A provider must re-adopt
/// supplied tokens rather than reissue them; this is what lets rotation
/// preserve the credentials the remote side already trusts.
///
/// [`bind_key`]: RemoteStore::bind_key
/// [`ensure_tokens`]: RemoteStore::ensure_tokens
pub trait RemoteStore {
    /// Whether this provider has been configured at all. Unconfigured
    /// providers fail every network operation with
    /// [`SyncError::NotConfigured`].
    fn is_configured(&self) -> bool;

    /// Rebind the provider's key reference to a new cryptor. Local only.
    fn bind_key(&mut self, cryptor: &Cryptor);

    /// Establish credentials. Adopts `tokens` when given; otherwise reuses
    /// whatever the provider already holds, or has fresh ones issued.
    fn ensure_tokens(
        &mut self,
        tokens: Option<SyncTokens>,
    ) -> impl Future<Output = Result<SyncTokens, SyncError>> + Send;

    /// Current credentials, if any.
    fn read_tokens(&self) -> Option<SyncTokens>;

    /// Overwrite the stored credentials.
    fn write_tokens(&mut self, tokens: SyncTokens);

    /// Upload an encrypted blob, replacing the remote copy.
    fn push(&mut self, blob: &[u8]) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Download the remote encrypted blob.
    fn pull(&self) -> impl Future<Output = Result<Vec<u8>, SyncError>> + Send;
}
