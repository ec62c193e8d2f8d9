//! Directory-backed remote store.
//!
//! The simplest useful provider: the "remote" is a directory (typically on
//! a mounted network share or a cloud-synced folder) holding the blob and
//! a tokens file. Also the provider exercised by the CLI.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::crypto::Cryptor;

use super::{RemoteStore, SyncError, SyncTokens};

const BLOB_FILE: &str = "vault.swftx";
const TOKENS_FILE: &str = "tokens.json";

/// Remote store rooted at a directory, unconfigured when no root is set.
#[derive(Debug, Default)]
pub struct FolderRemote {
    root: Option<PathBuf>,
    key_id: Option<String>,
}

impl FolderRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            key_id: None,
        }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }

    fn root(&self) -> Result<&Path, SyncError> {
        self.root.as_deref().ok_or(SyncError::NotConfigured)
    }

    fn blob_path(&self) -> Result<PathBuf, SyncError> {
        Ok(self.root()?.join(BLOB_FILE))
    }

    fn tokens_path(&self) -> Result<PathBuf, SyncError> {
        Ok(self.root()?.join(TOKENS_FILE))
    }

    fn load_tokens(&self) -> Option<SyncTokens> {
        let path = self.tokens_path().ok()?;
        let raw = std::fs::read(&path).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    fn store_tokens(&self, tokens: &SyncTokens) -> Result<(), SyncError> {
        let path = self.tokens_path()?;
        if let Some(root) = self.root.as_deref() {
            std::fs::create_dir_all(root).map_err(SyncError::Transport)?;
        }
        let raw = serde_json::to_vec(tokens).map_err(|e| SyncError::Malformed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(SyncError::Transport)
    }
}

impl RemoteStore for FolderRemote {
    fn is_configured(&self) -> bool {
        self.root.is_some()
    }

    fn bind_key(&mut self, cryptor: &Cryptor) {
        debug!(key_id = %cryptor.key_id(), "Remote store rebound to key");
        self.key_id = Some(cryptor.key_id());
    }

    async fn ensure_tokens(&mut self, tokens: Option<SyncTokens>) -> Result<SyncTokens, SyncError> {
        self.root()?;

        // Caller-supplied tokens win: re-adopt them verbatim.
        if let Some(tokens) = tokens {
            self.store_tokens(&tokens)?;
            return Ok(tokens);
        }
        // Otherwise reuse what we hold, or have a fresh pair issued.
        if let Some(existing) = self.load_tokens() {
            return Ok(existing);
        }
        let issued = SyncTokens::issue();
        self.store_tokens(&issued)?;
        debug!("Fresh sync credentials issued");
        Ok(issued)
    }

    fn read_tokens(&self) -> Option<SyncTokens> {
        self.load_tokens()
    }

    fn write_tokens(&mut self, tokens: SyncTokens) {
        if let Err(e) = self.store_tokens(&tokens) {
            warn!(error = %e, "Failed to persist sync tokens");
        }
    }

    async fn push(&mut self, blob: &[u8]) -> Result<(), SyncError> {
        let path = self.blob_path()?;
        if self.load_tokens().is_none() {
            return Err(SyncError::Unauthorized);
        }
        fs::create_dir_all(self.root()?).await?;
        fs::write(&path, blob).await?;
        debug!(path = %path.display(), size = blob.len(), "Blob uploaded");
        Ok(())
    }

    async fn pull(&self) -> Result<Vec<u8>, SyncError> {
        let path = self.blob_path()?;
        match fs::read(&path).await {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::RemoteEmpty),
            Err(e) => Err(SyncError::Transport(e)),
        }
    }
}
