//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Unset leaves the HTTP client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ApiConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Endpoint paths relative to `base_url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_login")]
    pub login: String,

    #[serde(default = "default_register")]
    pub register: String,

    #[serde(default = "default_profile")]
    pub profile: String,

    #[serde(default = "default_contacts")]
    pub contacts: String,

    #[serde(default = "default_organizations")]
    pub organizations: String,

    #[serde(default = "default_roles")]
    pub roles: String,
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_register() -> String {
    "/register".to_string()
}

fn default_profile() -> String {
    "/user-profile".to_string()
}

fn default_contacts() -> String {
    "/api/contacts".to_string()
}

fn default_organizations() -> String {
    "/api/organizations".to_string()
}

fn default_roles() -> String {
    "/api/roles".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: default_login(),
            register: default_register(),
            profile: default_profile(),
            contacts: default_contacts(),
            organizations: default_organizations(),
            roles: default_roles(),
        }
    }
}

/// Secure token storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Encrypted store file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Environment variable holding a base64 32-byte key.
    /// When unset, a key file is created next to the store.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Key under which the bearer token is persisted
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./.contactbook/secure-store")
}

fn default_key_env() -> String {
    "CONTACTBOOK_STORE_KEY".to_string()
}

fn default_token_key() -> String {
    crate::storage::TOKEN_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            key_env: default_key_env(),
            token_key: default_token_key(),
        }
    }
}

impl StorageConfig {
    /// Path of the generated key file used when `key_env` is not set
    pub fn key_file(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "secure-store".into());
        name.push(".key");
        self.path.with_file_name(name)
    }
}

/// Session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Drop the session whenever any API call is rejected as unauthorized
    #[serde(default = "default_invalidate_on_unauthorized")]
    pub invalidate_on_unauthorized: bool,
}

fn default_invalidate_on_unauthorized() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            invalidate_on_unauthorized: default_invalidate_on_unauthorized(),
        }
    }
}

/// Client-side checks applied before a registration is sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Restrict registration to addresses under this domain
    #[serde(default)]
    pub email_domain: Option<String>,

    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,

    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_min_name_len() -> usize {
    3
}

fn default_min_password_len() -> usize {
    8
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            email_domain: None,
            min_name_len: default_min_name_len(),
            min_password_len: default_min_password_len(),
        }
    }
}
