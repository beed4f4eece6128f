//! Durable round history and best level for the n-back engine.

pub mod error;
pub mod schema;
pub mod store;
pub mod time;

use std::path::PathBuf;

pub use error::{Result, StoreError};
pub use store::{Store, StoredRound};

/// `$HOME/.nback`, falling back to the working directory.
pub fn default_base_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".nback")
}
