//! Session state

use serde::Serialize;
use std::fmt;

use crate::auth::User;

/// Tri-state authentication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// The stored token has not been checked yet
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl AuthStatus {
    /// Whether startup has decided one way or the other
    pub fn is_resolved(self) -> bool {
        self != AuthStatus::Unknown
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthStatus::Authenticated
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Unknown => write!(f, "unknown"),
            AuthStatus::Authenticated => write!(f, "authenticated"),
            AuthStatus::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// In-memory record of the current authentication.
///
/// Only the three constructors can build a `Session`, so an authenticated
/// session always carries a token and a user and a signed-out session never
/// carries either.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    status: AuthStatus,
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// State at process start, before the stored token is checked
    pub fn unknown() -> Self {
        Self {
            status: AuthStatus::Unknown,
            token: None,
            user: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            token: None,
            user: None,
        }
    }

    pub fn signed_in(token: String, user: User) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    /// Same session with a refreshed profile. Sessions without a user are returned unchanged.
    pub(crate) fn with_user(mut self, user: User) -> Self {
        if self.is_authenticated() {
            self.user = Some(user);
        }
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}
