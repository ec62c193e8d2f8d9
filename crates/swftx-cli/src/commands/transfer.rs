//! Export and import commands - encrypted backups of the vault file.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args as ClapArgs;
use tracing::instrument;

use swftx_core::{RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[derive(ClapArgs, Clone)]
pub struct ExportArgs {
    /// Destination file for the encrypted backup
    pub path: PathBuf,
}

#[derive(ClapArgs, Clone)]
pub struct ImportArgs {
    /// Backup file to restore from
    pub path: PathBuf,
}

#[instrument(level = "info", name = "cmd::export", skip_all, fields(path = %args.path.display()))]
pub fn export<R: RemoteStore>(manager: &VaultManager<R>, args: ExportArgs) -> Result<()> {
    if !manager.vault_exists() {
        bail!("no vault found; nothing to export");
    }
    manager.export_vault(&args.path)?;
    println!("Encrypted vault exported to {}", args.path.display());
    Ok(())
}

#[instrument(level = "info", name = "cmd::import", skip_all, fields(path = %args.path.display()))]
pub async fn import<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
    args: ImportArgs,
) -> Result<()> {
    let password = auth::read_password(passwords, "Password the backup was sealed under")?;
    if manager.import_vault(&args.path, password).await? {
        println!("Vault restored from {}", args.path.display());
        Ok(())
    } else {
        bail!(
            "{} is not a vault backup or the password is wrong; local vault unchanged",
            args.path.display()
        );
    }
}
