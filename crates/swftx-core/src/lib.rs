#![forbid(unsafe_code)]

//! swftx-core: an encrypted local secrets vault.
//!
//! The vault is a single authenticated blob on disk, unlocked by trial
//! decryption under a master password and optionally mirrored to a remote
//! store. The interesting machinery is the two-tier encryption scheme
//! ([`crypto`]), the atomic master-password rotation ([`rotation`]) and
//! the push/pull reconciliation contract ([`sync`]). The UI layer drives
//! everything through [`session::VaultManager`].

pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod rotation;
pub mod session;
pub mod storage;
pub mod store;
pub mod sync;

pub use crypto::{Cryptor, Envelope, EntryCipher, KdfParams};
pub use model::{Entry, Vault};
pub use rotation::{RotationCoordinator, RotationReport, RotationState, SyncOutcome};
pub use session::{Session, VaultManager};
pub use storage::Storage;
pub use store::VaultStore;
pub use sync::{FolderRemote, RemoteStore, SyncClient, SyncTokens};
