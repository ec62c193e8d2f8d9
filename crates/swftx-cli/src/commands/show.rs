//! Show command - reveal one entry's secret on stdout.
//!
//! The secret goes to stdout alone so it can be piped; everything else
//! prints to stderr.

use anyhow::{Result, bail};
use clap::Args as ClapArgs;
use tracing::instrument;
use uuid::Uuid;

use swftx_core::{Entry, RemoteStore, VaultManager};

use crate::PasswordOptions;
use crate::auth;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Entry title or id
    pub entry: String,
}

fn matches(entry: &Entry, wanted: &str, wanted_id: Option<Uuid>) -> bool {
    wanted_id == Some(entry.id) || entry.title == wanted
}

#[instrument(level = "info", name = "cmd::show", skip_all, fields(entry = %args.entry))]
pub async fn run<R: RemoteStore>(
    manager: &VaultManager<R>,
    passwords: &PasswordOptions,
    args: Args,
) -> Result<()> {
    let session = auth::unlock(manager, passwords).await?;
    let vault = manager.read(&session)?;

    let wanted_id = Uuid::parse_str(&args.entry).ok();
    let mut hits = vault
        .entries
        .iter()
        .filter(|e| matches(e, &args.entry, wanted_id));

    let Some(entry) = hits.next() else {
        bail!("no entry matches \"{}\"", args.entry);
    };
    if hits.next().is_some() {
        bail!(
            "\"{}\" matches more than one entry; use the id from `swftx list`",
            args.entry
        );
    }

    let secret = manager.reveal(&session, entry)?;
    eprintln!("{} ({})", entry.title, entry.id);
    println!("{}", secret.as_str());
    Ok(())
}
