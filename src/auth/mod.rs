//! Authentication models, token inspection and registration checks

pub mod jwt;
pub mod models;
pub mod validate;

pub use jwt::{inspect_token, Claims};
pub use models::{LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, TokenResponse, User};
pub use validate::{validate_registration, RegistrationForm, ValidationErrors};
