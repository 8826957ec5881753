//! Secure key-value storage for session credentials.
//!
//! The session layer only ever talks to the [`SecureStore`] trait. Two
//! implementations are provided: [`EncryptedFileStore`], an AES-256-GCM
//! encrypted file that survives process restarts, and [`MemoryStore`], which
//! keeps everything in memory and is meant for tests and throwaway sessions.

mod encrypted;
mod memory;

pub use encrypted::{resolve_key, EncryptedFileStore};
pub use memory::MemoryStore;

use crate::config::StorageConfig;
use crate::error::Result;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "jwtoken";

/// Device-local key-value store for secret strings.
///
/// Implementations must be `Send + Sync`; the session manager shares one
/// store across tasks.
pub trait SecureStore: Send + Sync {
    /// Retrieves the value for `key`, `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or decrypted.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn delete(&self, key: &str) -> Result<()>;

    /// Checks whether `key` is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Open the encrypted store described by the configuration
pub fn open_store(config: &StorageConfig) -> Result<EncryptedFileStore> {
    let key = resolve_key(config)?;
    EncryptedFileStore::open(&config.path, &key)
}
