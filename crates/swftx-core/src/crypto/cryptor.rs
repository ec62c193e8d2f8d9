//! The [`Cryptor`]: both encryption tiers keyed from one master password.

use std::fmt;

use aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::model::{Entry, Vault};

use super::kdf::{self, KdfParams, KeySet, SALT_LEN};
use super::{DecryptionError, EncryptionError, KeyDerivationError};

/// Magic bytes opening every envelope blob (format name + version).
pub const MAGIC: &[u8; 6] = b"SWFTX1";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
/// magic + log_n + r + p + salt
const HEADER_LEN: usize = 6 + 1 + 4 + 4 + SALT_LEN;

/// Text prefix marking an obscured entry secret.
const SECRET_PREFIX: &str = "v1:";

/// Whole-vault envelope encryption.
///
/// Kept as a separate contract from [`EntryCipher`] so either layer's
/// algorithm could be substituted independently.
pub trait Envelope {
    /// Serialize and encrypt a vault into a self-describing blob.
    ///
    /// A fresh nonce is drawn per call, so encrypting identical content
    /// twice never yields identical ciphertext.
    fn encrypt_data(&self, vault: &Vault) -> Result<Vec<u8>, EncryptionError>;

    /// Verify and decrypt a blob back into a vault.
    ///
    /// Verify-then-decode: no partial or garbage vault is ever returned.
    fn decrypt_data(&self, blob: &[u8]) -> Result<Vault, DecryptionError>;
}

/// Per-entry secret transformation, the second encryption tier.
pub trait EntryCipher {
    /// Encrypt an exposed entry's secret under this cryptor's entry key,
    /// leaving all other fields intact.
    fn obscure(&self, entry: Entry) -> Result<Entry, EncryptionError>;

    /// Decrypt an obscured entry's secret back to its exposed form.
    ///
    /// `expose` under the old key followed by `obscure` under a new key is
    /// the re-keying pipeline used by rotation.
    fn expose(&self, entry: Entry) -> Result<Entry, DecryptionError>;
}

/// Symmetric encryption engine for one key generation.
///
/// A cryptor is a value: KDF parameters, salt and the two derived keys.
/// It carries no shared mutable state and performs no I/O. Two cryptors
/// (old and new generation) coexist only inside a rotation.
pub struct Cryptor {
    params: KdfParams,
    keys: KeySet,
}

impl fmt::Debug for Cryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cryptor")
            .field("key_id", &self.key_id())
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl Cryptor {
    /// Derive a cryptor for a brand new key generation (fresh salt,
    /// recommended cost parameters). Used by setup and rotation.
    pub fn generate(password: &SecretString) -> Result<Self, KeyDerivationError> {
        Self::derive(password, KdfParams::recommended())
    }

    /// Derive a cryptor from a password and explicit parameters, typically
    /// parsed from an existing blob header via [`parse_header`].
    ///
    /// CPU-bound (scrypt); wrap in `spawn_blocking` on an async runtime.
    pub fn derive(password: &SecretString, params: KdfParams) -> Result<Self, KeyDerivationError> {
        let keys = kdf::derive_keys(password, &params)?;
        Ok(Self { params, keys })
    }

    /// [`derive`](Self::derive) on a blocking thread, for async callers.
    pub async fn derive_blocking(
        password: SecretString,
        params: KdfParams,
    ) -> Result<Self, KeyDerivationError> {
        tokio::task::spawn_blocking(move || Self::derive(&password, params))
            .await
            .map_err(|e| KeyDerivationError::Derivation(format!("task join: {e}")))?
    }

    /// The KDF parameters this cryptor encrypts under.
    #[must_use]
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Public fingerprint of this key generation (hex of the KDF salt).
    ///
    /// Safe to log and to hand to a sync provider for key binding; it
    /// reveals nothing about the password or the derived keys.
    #[must_use]
    pub fn key_id(&self) -> String {
        hex::encode(self.params.salt)
    }

    fn envelope_cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*self.keys.envelope))
    }

    fn entry_cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*self.keys.entry))
    }
}

/// Parse the KDF parameters out of an envelope blob header.
///
/// This is how authentication bootstraps: read the live blob, parse its
/// header, derive a trial cryptor, attempt decryption.
pub fn parse_header(blob: &[u8]) -> Result<KdfParams, DecryptionError> {
    if blob.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(DecryptionError::Malformed("blob too short"));
    }
    if &blob[..6] != MAGIC {
        return Err(DecryptionError::Malformed("bad magic"));
    }

    let log_n = blob[6];
    let r = u32::from_be_bytes(blob[7..11].try_into().expect("fixed slice"));
    let p = u32::from_be_bytes(blob[11..15].try_into().expect("fixed slice"));
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&blob[15..HEADER_LEN]);

    Ok(KdfParams { log_n, r, p, salt })
}

impl Envelope for Cryptor {
    fn encrypt_data(&self, vault: &Vault) -> Result<Vec<u8>, EncryptionError> {
        let plaintext = serde_json::to_vec(vault)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .envelope_cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
            .map_err(|e| EncryptionError::Cipher(e.to_string()))?;

        let mut blob = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(MAGIC);
        blob.push(self.params.log_n);
        blob.extend_from_slice(&self.params.r.to_be_bytes());
        blob.extend_from_slice(&self.params.p.to_be_bytes());
        blob.extend_from_slice(&self.params.salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        debug!(blob_size = blob.len(), "Vault envelope encrypted");
        Ok(blob)
    }

    fn decrypt_data(&self, blob: &[u8]) -> Result<Vault, DecryptionError> {
        let params = parse_header(blob)?;
        if params != self.params {
            return Err(DecryptionError::ForeignHeader);
        }

        let nonce = Nonce::from_slice(&blob[HEADER_LEN..HEADER_LEN + NONCE_LEN]);
        let ciphertext = &blob[HEADER_LEN + NONCE_LEN..];

        let plaintext = self
            .envelope_cipher()
            .decrypt(nonce, ciphertext)
            .map_err(|_| {
                warn!("Envelope decryption failed - authentication tag mismatch");
                DecryptionError::AuthenticationFailed
            })?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl EntryCipher for Cryptor {
    fn obscure(&self, mut entry: Entry) -> Result<Entry, EncryptionError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .entry_cipher()
            .encrypt(Nonce::from_slice(&nonce), entry.secret.as_bytes())
            .map_err(|e| EncryptionError::Cipher(e.to_string()))?;

        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        entry.secret = format!("{SECRET_PREFIX}{}", BASE64.encode(raw));
        Ok(entry)
    }

    fn expose(&self, mut entry: Entry) -> Result<Entry, DecryptionError> {
        let encoded = entry
            .secret
            .strip_prefix(SECRET_PREFIX)
            .ok_or(DecryptionError::SecretEncoding)?;
        let raw = BASE64
            .decode(encoded)
            .map_err(|_| DecryptionError::SecretEncoding)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptionError::SecretEncoding);
        }

        let nonce = Nonce::from_slice(&raw[..NONCE_LEN]);
        let plaintext = self
            .entry_cipher()
            .decrypt(nonce, &raw[NONCE_LEN..])
            .map_err(|_| {
                warn!(entry = %entry.id, "Entry secret decryption failed");
                DecryptionError::AuthenticationFailed
            })?;

        entry.secret = String::from_utf8(plaintext).map_err(|_| DecryptionError::SecretEncoding)?;
        Ok(entry)
    }
}
