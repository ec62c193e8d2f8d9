//! Two-tier symmetric encryption for the vault.
//!
//! The envelope layer encrypts the whole serialized vault as one
//! authenticated blob; the entry layer independently protects each entry's
//! secret field so that a decrypted envelope still never holds secrets in
//! clear form. Both layers are AES-256-GCM keyed from one master password
//! via scrypt (see [`kdf`]).

pub mod cryptor;
pub mod kdf;

use thiserror::Error;

/// Errors from password-based key derivation.
#[derive(Error, Debug)]
pub enum KeyDerivationError {
    /// The scrypt cost parameters are out of range.
    ///
    /// When the parameters came from a blob header this means a corrupted
    /// or foreign file rather than a wrong password.
    #[error("invalid scrypt parameters: {0}")]
    InvalidParams(String),

    /// The scrypt computation itself failed.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Errors from envelope or entry decryption.
///
/// Every variant is recoverable: wrong keys, tampering and corruption are
/// all surfaced here and never returned as partial plaintext.
#[derive(Error, Debug)]
pub enum DecryptionError {
    /// The blob is too short or does not start with the expected magic.
    #[error("malformed vault blob: {0}")]
    Malformed(&'static str),

    /// The blob header was produced under different KDF parameters than
    /// this cryptor's. Decrypting it requires re-deriving from the header.
    #[error("vault blob was encrypted under a different key generation")]
    ForeignHeader,

    /// The KDF parameters embedded in the header are unusable.
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    /// Authentication tag verification failed: wrong key, or the
    /// ciphertext has been corrupted or tampered with. The two are
    /// cryptographically indistinguishable.
    #[error("authentication failed - wrong key or corrupted/tampered data")]
    AuthenticationFailed,

    /// The plaintext did not parse as a well-formed vault.
    #[error("decrypted payload is not a well-formed vault: {0}")]
    Decode(#[from] serde_json::Error),

    /// A per-entry secret is not in the expected text encoding.
    #[error("entry secret is not in the expected encoding")]
    SecretEncoding,
}

/// Errors from envelope or entry encryption.
#[derive(Error, Debug)]
pub enum EncryptionError {
    /// The AEAD backend rejected the operation.
    #[error("encryption failed: {0}")]
    Cipher(String),

    /// The vault could not be serialized.
    #[error("vault serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub use cryptor::{Cryptor, Envelope, EntryCipher, parse_header};
pub use kdf::KdfParams;
