//! JWT claim inspection
//!
//! The client never holds the server's signing key, so tokens are decoded
//! without signature verification. Claims are only used as a local hint
//! (e.g. skipping a network round trip for a token that has clearly expired);
//! the server stays the authority on whether a token is valid.

use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims this client cares about. Everything else in the payload is ignored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Claims {
    /// Subject, usually the username or email
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiration time
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Check if token is expired. Tokens without `exp` never expire locally.
    pub fn is_expired(&self) -> bool {
        self.exp
            .is_some_and(|exp| chrono::Utc::now().timestamp() >= exp)
    }
}

/// Decode the claims of a JWT without verifying its signature.
///
/// Returns `None` for opaque (non-JWT) tokens or undecodable payloads.
pub fn inspect_token(token: &str) -> Option<Claims> {
    let header = decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token payload is not a readable JWT: {}", e);
            None
        }
    }
}
