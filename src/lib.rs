//! Contactbook - contact and organization directory client
//!
//! This is the library interface for Contactbook: session management,
//! secure token storage and typed access to the directory API.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod session;
pub mod storage;

pub use config::Config;
pub use directory::Directory;
pub use error::Error;
pub use session::{AuthStatus, Session, SessionManager};
