//! Password acquisition and vault unlocking.

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};

use swftx_core::{RemoteStore, Session, VaultManager};

use crate::PasswordOptions;

/// Read one password line from `reader`, trimming the trailing newline.
///
/// Called once per password, so stacked flows (current password on line
/// one, new password on line two) read successive lines.
fn read_password_line(reader: &mut impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        bail!("empty password on stdin");
    }
    Ok(SecretString::from(trimmed.to_string()))
}

/// Read the next password line from the process's stdin.
pub fn read_stdin_password() -> Result<SecretString> {
    read_password_line(&mut io::stdin().lock())
}

/// Read a password per the CLI options: flag/env, stdin, or a prompt.
pub fn read_password(opts: &PasswordOptions, prompt: &str) -> Result<SecretString> {
    if let Some(password) = &opts.password {
        return Ok(SecretString::from(password.clone()));
    }
    if opts.password_stdin {
        return read_stdin_password();
    }
    let password = rpassword::prompt_password(format!("{prompt}: "))
        .context("failed to read password from terminal")?;
    Ok(SecretString::from(password))
}

/// Prompt twice (unless non-interactive) and require both entries match.
pub fn read_new_password(opts: &PasswordOptions, prompt: &str) -> Result<SecretString> {
    let first = read_password(opts, prompt)?;
    if opts.password.is_some() || opts.password_stdin {
        return Ok(first);
    }
    let second = rpassword::prompt_password("Repeat to confirm: ")
        .context("failed to read password from terminal")?;
    if first.expose_secret() != second {
        bail!("passwords do not match");
    }
    Ok(first)
}

/// Unlock the vault or exit with a useful message.
pub async fn unlock<R: RemoteStore>(
    manager: &VaultManager<R>,
    opts: &PasswordOptions,
) -> Result<Session> {
    if !manager.vault_exists() {
        bail!("no vault found; run `swftx init` first");
    }
    let password = read_password(opts, "Master password")?;
    match manager.authenticate(password).await? {
        Some(session) => Ok(session),
        None => bail!("invalid master password"),
    }
}
