//! Error types, re-exported from their home modules.

pub use crate::crypto::{DecryptionError, EncryptionError, KeyDerivationError};
pub use crate::rotation::RotationError;
pub use crate::session::{AuthError, ImportFacadeError, SaveError, SetupFacadeError, VaultReadError};
pub use crate::storage::StorageError;
pub use crate::store::{ImportError, SetupError};
pub use crate::sync::SyncError;
