//! Status command - show vault location and state without unlocking.

use std::path::Path;

use anyhow::Result;
use tracing::instrument;

use swftx_core::{RemoteStore, VaultManager};

use crate::output::create_table;

#[instrument(level = "info", name = "cmd::status", skip_all)]
pub async fn run<R: RemoteStore>(manager: &VaultManager<R>, vault_path: &Path) -> Result<()> {
    let exists = manager.vault_exists();
    let state = if !exists {
        "missing"
    } else if manager.is_pristine()? {
        "pristine (no master password set)"
    } else {
        "initialized"
    };

    let mut table = create_table();
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["Vault file".to_string(), vault_path.display().to_string()]);
    table.add_row(vec!["State".to_string(), state.to_string()]);

    if let Some(params) = manager.store().kdf_params()? {
        table.add_row(vec![
            "KDF".to_string(),
            format!("scrypt (N=2^{}, r={}, p={})", params.log_n, params.r, params.p),
        ]);
    }

    let sync = if manager.sync_configured().await {
        match manager.sync_tokens().await {
            Some(_) => "configured (session established)",
            None => "configured",
        }
    } else {
        "not configured"
    };
    table.add_row(vec!["Remote".to_string(), sync.to_string()]);

    println!("{table}");
    Ok(())
}
