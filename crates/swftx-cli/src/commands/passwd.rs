//! Change-password command - rotate the master password.

use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use tracing::instrument;

use swftx_core::{RemoteStore, SyncOutcome, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[instrument(level = "info", name = "cmd::change_password", skip_all)]
pub async fn run<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
) -> Result<()> {
    if !manager.vault_exists() {
        bail!("no vault found; run `swftx init` first");
    }

    let current = auth::read_password(passwords, "Current master password")?;

    // With --password-stdin the next stdin line is the new password
    // (current on line one, new on line two); otherwise it is prompted
    // and confirmed interactively. --password only covers the current
    // password, since a single flag value cannot carry both.
    let new = if passwords.password_stdin {
        auth::read_stdin_password()?
    } else {
        let new = rpassword::prompt_password("New master password: ")
            .context("failed to read password from terminal")?;
        let confirm = rpassword::prompt_password("Repeat to confirm: ")
            .context("failed to read password from terminal")?;
        if new != confirm {
            bail!("passwords do not match");
        }
        if new.is_empty() {
            bail!("new password must not be empty");
        }
        SecretString::from(new)
    };

    let (session, report) = manager.rotate_master_password(current, new).await?;

    println!("Master password changed; {} entries re-keyed", report.entries);
    println!("New key id: {}", session.key_id());
    match report.sync {
        SyncOutcome::NotConfigured => {}
        SyncOutcome::Pushed => println!("Remote vault updated"),
        SyncOutcome::ReinitFailed(e) => {
            eprintln!("Warning: the password change took effect locally, but the sync session could not be re-established: {e}");
            eprintln!("The remote store still holds the old vault; run `swftx push` once sync is repaired");
        }
        SyncOutcome::PushFailed(e) => {
            eprintln!("Warning: local rotation succeeded but the remote push failed: {e}");
            eprintln!("Run `swftx push` once the remote is reachable");
        }
    }
    Ok(())
}
