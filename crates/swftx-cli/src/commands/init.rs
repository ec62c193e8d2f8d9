//! Init command - create a fresh, empty, encrypted vault.

use anyhow::{Result, bail};
use tracing::instrument;

use swftx_core::{RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[instrument(level = "info", name = "cmd::init", skip_all)]
pub async fn run<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
) -> Result<()> {
    if manager.vault_exists() {
        bail!(
            "a vault already exists at {}; delete it first if you really want to start over",
            manager.store().path().display()
        );
    }

    let password = auth::read_new_password(passwords, "New master password")?;
    let session = manager.setup(password).await?;

    println!("Vault created at {}", manager.store().path().display());
    println!("Key id: {}", session.key_id());
    Ok(())
}
