//! AES-256-GCM encrypted file store.
//!
//! The whole key-value map is serialized as JSON and sealed as a single
//! blob: `base64(nonce || ciphertext)`. Every write re-encrypts with a fresh
//! nonce and replaces the file atomically through a temporary sibling.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SecureStore;
use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Key size for AES-256 (256 bits).
const KEY_SIZE: usize = 32;

/// Encrypted, file-backed [`SecureStore`]
pub struct EncryptedFileStore {
    path: PathBuf,
    cipher: Aes256Gcm,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStore {
    /// Open a store at `path` with a raw 32-byte key. The file is created on first write.
    pub fn open(path: &Path, key: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE {
            return Err(Error::Crypto(format!(
                "Invalid key length: expected {} bytes, got {}",
                KEY_SIZE,
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| Error::Crypto(format!("Failed to create cipher: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            cipher,
            lock: Mutex::new(()),
        })
    }

    /// Location of the encrypted file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let encoded = fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let sealed = BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::Crypto(format!("Invalid store encoding: {}", e)))?;

        if sealed.len() < NONCE_SIZE {
            return Err(Error::Crypto("Store file is truncated".to_string()));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Crypto("Failed to decrypt store (wrong key?)".to_string()))?;

        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let plaintext = serde_json::to_vec(map)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        write_private(&tmp, BASE64.encode(sealed).as_bytes())?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }

    /// Map to modify on write. A store that no longer decrypts (key changed
    /// or regenerated) is discarded so sign-in and sign-out keep working.
    fn writable_map(&self) -> Result<BTreeMap<String, String>> {
        match self.read_map() {
            Err(e @ (Error::Crypto(_) | Error::Json(_))) => {
                tracing::warn!(
                    "Discarding unreadable store {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn readable(&self) -> bool {
        self.read_map().is_ok()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| Error::Storage(format!("Store lock poisoned: {}", e)))
    }
}

impl SecureStore for EncryptedFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut map = self.writable_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut map = self.writable_map()?;
        if map.remove(key).is_none() && self.readable() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// Resolve the store key: the configured environment variable first, then a
/// key file next to the store, generating one on first use.
pub fn resolve_key(config: &StorageConfig) -> Result<Vec<u8>> {
    if let Ok(encoded) = env::var(&config.key_env) {
        tracing::debug!("Using store key from ${}", config.key_env);
        return decode_key(&encoded);
    }

    let key_file = config.key_file();
    if key_file.exists() {
        let encoded = fs::read_to_string(&key_file)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", key_file.display(), e)))?;
        return decode_key(&encoded);
    }

    let key = Aes256Gcm::generate_key(OsRng);
    if let Some(parent) = key_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }
    }
    write_private(&key_file, BASE64.encode(key).as_bytes())?;
    tracing::info!("Generated new store key at {}", key_file.display());
    Ok(key.to_vec())
}

fn decode_key(encoded: &str) -> Result<Vec<u8>> {
    let key = BASE64
        .decode(encoded.trim())
        .map_err(|e| Error::Crypto(format!("Invalid base64 key: {}", e)))?;
    if key.len() != KEY_SIZE {
        return Err(Error::Crypto(format!(
            "Invalid key length: expected {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }
    Ok(key)
}

fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| Error::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    file.write_all(contents)
        .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(())
}
