//! Remote API access

pub mod client;
pub mod credentials;
pub mod models;

pub use client::ApiClient;
pub use credentials::{bearer, CredentialProvider};
pub use models::*;
