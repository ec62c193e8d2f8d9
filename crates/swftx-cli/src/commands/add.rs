//! Add command - append a new entry to the vault.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use swftx_core::{Entry, RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Entry title
    pub title: String,

    /// Account username
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Associated URL
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

#[instrument(level = "info", name = "cmd::add", skip_all, fields(title = %args.title))]
pub async fn run<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
    args: Args,
) -> Result<()> {
    let session = auth::unlock(manager, passwords).await?;

    let secret = rpassword::prompt_password("Secret for the new entry: ")
        .context("failed to read secret from terminal")?;

    let mut entry = Entry::new(&args.title, &args.username, &secret);
    entry.url = args.url;
    entry.note = args.note;
    let entry = manager.protect(&session, entry)?;

    let mut vault = manager.read(&session)?;
    vault.entries.push(entry);
    manager.save(&session, &vault)?;

    println!("Added \"{}\" ({} entries total)", args.title, vault.entries.len());
    Ok(())
}
