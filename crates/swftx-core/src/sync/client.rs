//! The sync session: push/pull between the local vault and a provider.

use tracing::{debug, info, instrument, warn};

use crate::crypto::{Cryptor, Envelope};
use crate::model::Vault;
use crate::store::VaultStore;

use super::{RemoteStore, SyncError, SyncTokens};

/// Manages one remote-store session over a concrete provider.
#[derive(Debug)]
pub struct SyncClient<R> {
    provider: R,
}

impl<R: RemoteStore> SyncClient<R> {
    pub fn new(provider: R) -> Self {
        Self { provider }
    }

    #[must_use]
    pub fn provider(&self) -> &R {
        &self.provider
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Establish (or re-establish) the session: bind the provider to the
    /// cryptor, then ensure credentials.
    ///
    /// Passing previously issued tokens preserves them; passing `None`
    /// lets the provider reuse or issue credentials as needed.
    #[instrument(level = "debug", skip_all)]
    pub async fn initialize(
        &mut self,
        cryptor: &Cryptor,
        tokens: Option<SyncTokens>,
    ) -> Result<SyncTokens, SyncError> {
        if !self.provider.is_configured() {
            return Err(SyncError::NotConfigured);
        }
        self.provider.bind_key(cryptor);
        let tokens = self.provider.ensure_tokens(tokens).await?;
        debug!("Sync session established");
        Ok(tokens)
    }

    pub fn read_tokens(&self) -> Option<SyncTokens> {
        self.provider.read_tokens()
    }

    pub fn write_tokens(&mut self, tokens: SyncTokens) {
        self.provider.write_tokens(tokens);
    }

    /// Upload an encrypted blob. Local state is untouched either way.
    pub async fn push(&mut self, blob: &[u8]) -> Result<(), SyncError> {
        self.provider.push(blob).await?;
        info!(size = blob.len(), "Vault pushed to remote store");
        Ok(())
    }

    /// Read the live blob from `store` and upload it.
    pub async fn push_current(&mut self, store: &VaultStore) -> Result<(), SyncError> {
        let blob = store.read()?;
        self.push(&blob).await
    }

    /// Full pull cycle: fetch the remote blob, decrypt it under the active
    /// cryptor, replace the local vault with it, and return the
    /// reconciled vault.
    ///
    /// Replace-on-pull at whole-vault granularity; there is no field-level
    /// merge. A remote blob that fails to decrypt leaves local state
    /// untouched.
    #[instrument(level = "debug", skip_all)]
    pub async fn perform(
        &mut self,
        store: &VaultStore,
        cryptor: &Cryptor,
    ) -> Result<Vault, SyncError> {
        let blob = self.provider.pull().await?;
        let vault = cryptor.decrypt_data(&blob).map_err(|e| {
            warn!(error = %e, "Pulled blob is not decryptable under the active key");
            SyncError::RemoteUndecryptable(e)
        })?;
        store.write(&blob)?;
        info!(entries = vault.entries.len(), "Vault pulled from remote store");
        Ok(vault)
    }
}
