//! Subcommand implementations.

pub mod add;
pub mod init;
pub mod list;
pub mod passwd;
pub mod show;
pub mod status;
pub mod sync;
pub mod transfer;
