//! Installed bearer credential shared by every outbound request

use std::sync::{Arc, PoisonError, RwLock};

/// Holder of the bearer token that API calls authenticate with.
///
/// Cloning shares the same slot. The session manager is the only writer;
/// the API client reads it on every request.
#[derive(Clone, Default)]
pub struct CredentialProvider {
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl CredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `token` as the credential for subsequent requests
    pub(crate) fn install(&self, token: &str) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.to_string());
    }

    /// Remove the installed credential
    pub(crate) fn clear(&self) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// The raw installed token
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_installed(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// `Authorization` header value for the installed token
    pub fn header_value(&self) -> Option<String> {
        self.token().map(|token| bearer(&token))
    }
}

/// Format a token as a bearer `Authorization` header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
