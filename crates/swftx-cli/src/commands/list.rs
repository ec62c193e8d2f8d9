//! List command - print the vault's entries (secrets stay obscured).

use anyhow::Result;
use tracing::instrument;

use swftx_core::{RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;
use crate::output::create_table;

#[instrument(level = "info", name = "cmd::list", skip_all)]
pub async fn run<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
) -> Result<()> {
    let session = auth::unlock(manager, passwords).await?;
    let vault = manager.read(&session)?;

    if vault.entries.is_empty() {
        println!("Vault is empty");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Id", "Title", "Username", "URL"]);
    for entry in &vault.entries {
        table.add_row(vec![
            entry.id.to_string(),
            entry.title.clone(),
            entry.username.clone(),
            entry.url.clone().unwrap_or_default(),
        ]);
    }

    println!("{table}");
    println!("{} entries", vault.entries.len());
    Ok(())
}
