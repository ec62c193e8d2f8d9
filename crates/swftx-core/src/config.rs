//! Vault file location.
//!
//! The backing file defaults to `vault.swftx`. `SWFTX_STORAGE_PATH`
//! overrides the full path (used by tests and staging setups);
//! `SWFTX_PROFILE` selects a profile-suffixed file so non-production
//! profiles never touch the production vault.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Default vault file name.
pub const DEFAULT_VAULT_FILE: &str = "vault.swftx";

/// Environment variable overriding the full vault path.
pub const STORAGE_PATH_ENV: &str = "SWFTX_STORAGE_PATH";

/// Environment variable selecting a profile (`production` or unset means
/// the default file).
pub const PROFILE_ENV: &str = "SWFTX_PROFILE";

/// Resolve the vault file path from the process environment.
#[must_use]
pub fn vault_file() -> PathBuf {
    resolve_vault_file(env::var_os(STORAGE_PATH_ENV), env::var_os(PROFILE_ENV))
}

/// Pure resolution, separated from the process environment for testing.
#[must_use]
pub fn resolve_vault_file(
    storage_override: Option<OsString>,
    profile: Option<OsString>,
) -> PathBuf {
    if let Some(path) = storage_override
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }

    match profile.and_then(|p| p.into_string().ok()) {
        Some(profile) if !profile.is_empty() && profile != "production" => {
            PathBuf::from(format!("vault_{profile}.swftx"))
        }
        _ => PathBuf::from(DEFAULT_VAULT_FILE),
    }
}
