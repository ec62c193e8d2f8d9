//! Password-based key derivation.
//!
//! One scrypt pass over the NFC-normalized master password yields 64 bytes,
//! split into the envelope key and the entry key. The parameters and salt
//! travel in the blob header, so trial decryption needs nothing beyond the
//! blob itself - there is no separately stored salt or password hash.

use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use super::KeyDerivationError;

/// KDF salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Default scrypt cost exponent (N = 2^15).
pub const DEFAULT_LOG_N: u8 = 15;
/// Default scrypt block size.
pub const DEFAULT_R: u32 = 8;
/// Default scrypt parallelism.
pub const DEFAULT_P: u32 = 1;

const DERIVED_LEN: usize = 64;

/// Scrypt parameters plus salt for one key generation.
///
/// A fresh salt is drawn whenever a new master password is established
/// (setup or rotation); the salt then stays fixed for the lifetime of that
/// password so repeated derivations agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
    pub salt: [u8; SALT_LEN],
}

impl KdfParams {
    /// Recommended parameters with a fresh random salt.
    #[must_use]
    pub fn recommended() -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        Self::with_salt(salt)
    }

    /// Recommended cost parameters with a caller-provided salt.
    #[must_use]
    pub fn with_salt(salt: [u8; SALT_LEN]) -> Self {
        Self {
            log_n: DEFAULT_LOG_N,
            r: DEFAULT_R,
            p: DEFAULT_P,
            salt,
        }
    }

    pub(crate) fn scrypt_params(&self) -> Result<scrypt::Params, KeyDerivationError> {
        scrypt::Params::new(self.log_n, self.r, self.p, DERIVED_LEN)
            .map_err(|e| KeyDerivationError::InvalidParams(e.to_string()))
    }
}

/// The two derived keys of one generation.
///
/// Raw key material is zeroized on drop and never leaves this module
/// except through the cipher constructors in [`super::cryptor`].
pub(crate) struct KeySet {
    pub(crate) envelope: Zeroizing<[u8; 32]>,
    pub(crate) entry: Zeroizing<[u8; 32]>,
}

/// Derive both keys from a master password.
///
/// The password is NFC-normalized first so that visually identical input
/// from different platforms derives the same keys. CPU-bound; callers on an
/// async runtime should wrap this in `spawn_blocking`.
pub(crate) fn derive_keys(
    password: &SecretString,
    params: &KdfParams,
) -> Result<KeySet, KeyDerivationError> {
    let normalized = Zeroizing::new(password.expose_secret().nfc().collect::<String>());

    let mut buf = Zeroizing::new([0u8; DERIVED_LEN]);
    scrypt::scrypt(
        normalized.as_bytes(),
        &params.salt,
        &params.scrypt_params()?,
        &mut buf[..],
    )
    .map_err(|e| KeyDerivationError::Derivation(e.to_string()))?;

    let mut envelope = Zeroizing::new([0u8; 32]);
    envelope.copy_from_slice(&buf[..32]);
    let mut entry = Zeroizing::new([0u8; 32]);
    entry.copy_from_slice(&buf[32..]);

    Ok(KeySet { envelope, entry })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params(salt: [u8; SALT_LEN]) -> KdfParams {
        KdfParams {
            log_n: 8,
            r: 8,
            p: 1,
            salt,
        }
    }

    #[test]
    fn same_password_and_salt_derive_same_keys() {
        let password = SecretString::from("correct horse");
        let params = fast_params([3u8; SALT_LEN]);

        let a = derive_keys(&password, &params).unwrap();
        let b = derive_keys(&password, &params).unwrap();
        assert_eq!(*a.envelope, *b.envelope);
        assert_eq!(*a.entry, *b.entry);
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let password = SecretString::from("correct horse");
        let a = derive_keys(&password, &fast_params([1u8; SALT_LEN])).unwrap();
        let b = derive_keys(&password, &fast_params([2u8; SALT_LEN])).unwrap();
        assert_ne!(*a.envelope, *b.envelope);
    }

    #[test]
    fn envelope_and_entry_keys_are_independent() {
        let password = SecretString::from("correct horse");
        let keys = derive_keys(&password, &fast_params([4u8; SALT_LEN])).unwrap();
        assert_ne!(*keys.envelope, *keys.entry);
    }

    #[test]
    fn passphrase_is_nfc_normalized() {
        // U+00E9 vs e + U+0301 (combining acute)
        let composed = SecretString::from("caf\u{e9}");
        let decomposed = SecretString::from("cafe\u{301}");
        let params = fast_params([5u8; SALT_LEN]);

        let a = derive_keys(&composed, &params).unwrap();
        let b = derive_keys(&decomposed, &params).unwrap();
        assert_eq!(*a.envelope, *b.envelope);
    }

    #[test]
    fn zero_cost_exponent_is_rejected() {
        let params = KdfParams {
            log_n: 0,
            r: 8,
            p: 1,
            salt: [0u8; SALT_LEN],
        };
        let result = derive_keys(&SecretString::from("pw"), &params);
        assert!(matches!(result, Err(KeyDerivationError::InvalidParams(_))));
    }
}
