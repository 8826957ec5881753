//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "contactbook.toml";

/// Load configuration from contactbook.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path.
///
/// A relative `storage.path` is taken relative to the directory holding the
/// config file, so every subdirectory of a project shares one store.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let mut config = parse_config(&content)?;

    if config.storage.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.storage.path = dir.join(&config.storage.path);
        }
    }

    Ok(config)
}

/// Parse configuration text, expanding environment variables first
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let base = config.api.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(Error::Config(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            config.api.base_url
        )));
    }
    if config.storage.token_key.is_empty() {
        return Err(Error::Config("storage.token_key must not be empty".to_string()));
    }
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; a failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Contactbook Configuration

[api]
base_url = "${CONTACTBOOK_API_URL:-http://localhost:8080}"
# timeout_secs = 30

# Endpoint paths, relative to base_url
# [api.endpoints]
# login = "/login"
# register = "/register"
# profile = "/user-profile"
# contacts = "/api/contacts"
# organizations = "/api/organizations"
# roles = "/api/roles"

[storage]
path = "./.contactbook/secure-store"
# Base64-encoded 32-byte key. A key file is generated when the variable is unset.
key_env = "CONTACTBOOK_STORE_KEY"
token_key = "jwtoken"

[session]
# Sign out as soon as any request is rejected as unauthorized
invalidate_on_unauthorized = true

[registration]
# email_domain = "stis.ac.id"
min_name_len = 3
min_password_len = 8
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_interpolation() {
        env::set_var("CONTACTBOOK_TEST_VAR", "hello");
        let content = "value = \"${CONTACTBOOK_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("CONTACTBOOK_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${CONTACTBOOK_NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_content_parses() {
        let config = parse_config(default_config_content()).expect("default config should parse");
        assert_eq!(config.storage.token_key, "jwtoken");
        assert_eq!(config.api.endpoints.profile, "/user-profile");
        assert!(config.session.invalidate_on_unauthorized);
        assert_eq!(config.registration.min_password_len, 8);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = parse_config("[api]\nbase_url = \"ftp://example.com\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").expect("empty config should parse");
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.endpoints.login, "/login");
        assert!(config.api.timeout().is_none());
    }
}
