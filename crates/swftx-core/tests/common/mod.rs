//! Shared fixtures: fast KDF parameters, a temp-dir vault builder and an
//! in-memory remote store with failure injection.

#![allow(dead_code)]

use secrecy::SecretString;
use tempfile::TempDir;

use swftx_core::crypto::kdf::SALT_LEN;
use swftx_core::sync::{RemoteStore, SyncError, SyncTokens};
use swftx_core::{Cryptor, Entry, EntryCipher, Envelope, KdfParams, Vault, VaultStore};

/// Weak scrypt cost so the suite stays fast; the salt is still random.
pub fn fast_params() -> KdfParams {
    KdfParams {
        log_n: 8,
        ..KdfParams::recommended()
    }
}

pub fn fast_cryptor(password: &str) -> Cryptor {
    Cryptor::derive(&SecretString::from(password), fast_params()).unwrap()
}

pub fn fast_cryptor_with_salt(password: &str, salt_byte: u8) -> Cryptor {
    let params = KdfParams {
        log_n: 8,
        r: 8,
        p: 1,
        salt: [salt_byte; SALT_LEN],
    };
    Cryptor::derive(&SecretString::from(password), params).unwrap()
}

/// A vault store in a fresh temp dir, populated with entries whose
/// plaintext secrets are `secrets`, obscured and enveloped under
/// `cryptor`.
pub fn seeded_store(cryptor: &Cryptor, secrets: &[&str]) -> (TempDir, VaultStore) {
    let dir = TempDir::new().unwrap();
    let store = VaultStore::new(dir.path().join("vault.swftx"));

    let entries = secrets
        .iter()
        .enumerate()
        .map(|(i, secret)| {
            cryptor
                .obscure(Entry::new(format!("entry-{i}"), "user", *secret))
                .unwrap()
        })
        .collect();
    let blob = cryptor.encrypt_data(&Vault { entries }).unwrap();
    store.write(&blob).unwrap();

    (dir, store)
}

/// In-memory provider with injectable misbehavior.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    pub configured: bool,
    pub blob: Option<Vec<u8>>,
    pub tokens: Option<SyncTokens>,
    pub key_id: Option<String>,
    /// Every push fails with a transport error.
    pub fail_push: bool,
    /// Credential establishment fails with a transport error.
    pub fail_ensure_tokens: bool,
    /// Simulate a provider that invalidates local credential state when
    /// its key reference is rebound (the hazard rotation guards against).
    pub wipe_tokens_on_bind: bool,
}

impl MemoryRemote {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }
}

impl RemoteStore for MemoryRemote {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn bind_key(&mut self, cryptor: &Cryptor) {
        self.key_id = Some(cryptor.key_id());
        if self.wipe_tokens_on_bind {
            self.tokens = None;
        }
    }

    async fn ensure_tokens(&mut self, tokens: Option<SyncTokens>) -> Result<SyncTokens, SyncError> {
        if !self.configured {
            return Err(SyncError::NotConfigured);
        }
        if self.fail_ensure_tokens {
            return Err(SyncError::Transport(std::io::Error::other(
                "injected credential failure",
            )));
        }
        let tokens = match tokens.or_else(|| self.tokens.clone()) {
            Some(t) => t,
            None => SyncTokens::issue(),
        };
        self.tokens = Some(tokens.clone());
        Ok(tokens)
    }

    fn read_tokens(&self) -> Option<SyncTokens> {
        self.tokens.clone()
    }

    fn write_tokens(&mut self, tokens: SyncTokens) {
        self.tokens = Some(tokens);
    }

    async fn push(&mut self, blob: &[u8]) -> Result<(), SyncError> {
        if !self.configured {
            return Err(SyncError::NotConfigured);
        }
        if self.fail_push {
            return Err(SyncError::Transport(std::io::Error::other(
                "injected push failure",
            )));
        }
        if self.tokens.is_none() {
            return Err(SyncError::Unauthorized);
        }
        self.blob = Some(blob.to_vec());
        Ok(())
    }

    async fn pull(&self) -> Result<Vec<u8>, SyncError> {
        if !self.configured {
            return Err(SyncError::NotConfigured);
        }
        self.blob.clone().ok_or(SyncError::RemoteEmpty)
    }
}
