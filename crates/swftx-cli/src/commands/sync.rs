//! Push and pull commands - mirror the vault through a remote store.

use anyhow::{Result, bail};
use tracing::instrument;

use swftx_core::{RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[instrument(level = "info", name = "cmd::push", skip_all)]
pub async fn push<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
) -> Result<()> {
    if !manager.sync_configured().await {
        bail!("no remote configured; pass --remote or set SWFTX_REMOTE");
    }
    let session = auth::unlock(manager, passwords).await?;
    manager.ensure_sync(&session).await?;
    manager.sync_push().await?;
    println!("Vault pushed to the remote store");
    Ok(())
}

#[instrument(level = "info", name = "cmd::pull", skip_all)]
pub async fn pull<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
) -> Result<()> {
    if !manager.sync_configured().await {
        bail!("no remote configured; pass --remote or set SWFTX_REMOTE");
    }
    let session = auth::unlock(manager, passwords).await?;
    manager.ensure_sync(&session).await?;
    let vault = manager.sync_pull(&session).await?;
    println!("Pulled remote vault ({} entries); local copy replaced", vault.entries.len());
    Ok(())
}
