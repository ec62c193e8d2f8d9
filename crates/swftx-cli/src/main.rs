#![deny(unsafe_code)]

mod auth;
mod commands;
mod output;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use swftx_core::{FolderRemote, VaultManager, VaultStore, config};

/// Command-line interface for swftx encrypted vaults
#[derive(Parser)]
#[command(name = "swftx")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Create a new vault
    swftx init

    # List entries (pipe password from a secret manager)
    echo \"$SECRET\" | swftx --password-stdin list

    # Change the master password
    swftx change-password

    # Mirror the vault to a synced folder
    swftx --remote ~/Dropbox/swftx push
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Vault file path (defaults to the per-user data directory)
    #[arg(long, value_name = "PATH", global = true)]
    vault: Option<PathBuf>,

    /// Remote store directory for push/pull
    #[arg(long, value_name = "DIR", env = "SWFTX_REMOTE", global = true)]
    remote: Option<PathBuf>,

    /// Vault password (insecure, prefer --password-stdin or SWFTX_PASSWORD)
    #[arg(long, env = "SWFTX_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Read password from stdin (single line)
    #[arg(long, conflicts_with = "password", global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh, empty, encrypted vault
    Init,

    /// Show vault location and state
    Status,

    /// List entries
    List,

    /// Add an entry (secret read like the master password)
    Add(commands::add::Args),

    /// Print one entry's secret to stdout
    Show(commands::show::Args),

    /// Change the master password (re-encrypts every entry)
    ChangePassword,

    /// Copy the encrypted vault to a backup file
    Export(commands::transfer::ExportArgs),

    /// Restore the vault from a backup file
    Import(commands::transfer::ImportArgs),

    /// Upload the encrypted vault to the remote store
    Push,

    /// Download the remote vault, replacing the local copy
    Pull,
}

/// Password options extracted from the CLI for the auth helpers.
#[derive(Clone, Default)]
pub struct PasswordOptions {
    pub password: Option<String>,
    pub password_stdin: bool,
}

impl From<&Cli> for PasswordOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            password: cli.password.clone(),
            password_stdin: cli.password_stdin,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.vault {
        return Ok(path.clone());
    }
    if let Some(path) = env::var_os(config::STORAGE_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("", "", "swftx")
        .context("could not determine a per-user data directory")?;
    Ok(dirs.data_dir().join(config::vault_file()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let vault_path = resolve_vault_path(&cli)?;
    tracing::debug!(path = %vault_path.display(), "Using vault");

    let provider = match &cli.remote {
        Some(dir) => FolderRemote::new(dir),
        None => FolderRemote::unconfigured(),
    };
    let manager = VaultManager::new(VaultStore::new(&vault_path), provider);
    let passwords = PasswordOptions::from(&cli);

    match cli.command {
        Commands::Init => commands::init::run(&manager, &passwords).await,
        Commands::Status => commands::status::run(&manager, &vault_path).await,
        Commands::List => commands::list::run(&manager, &passwords).await,
        Commands::Add(args) => commands::add::run(&manager, &passwords, args).await,
        Commands::Show(args) => commands::show::run(&manager, &passwords, args).await,
        Commands::ChangePassword => commands::passwd::run(&manager, &passwords).await,
        Commands::Export(args) => commands::transfer::export(&manager, args),
        Commands::Import(args) => commands::transfer::import(&manager, &passwords, args).await,
        Commands::Push => commands::sync::push(&manager, &passwords).await,
        Commands::Pull => commands::sync::pull(&manager, &passwords).await,
    }
}
