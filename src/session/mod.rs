//! Authentication session management

pub mod manager;
pub mod routing;
pub mod state;

pub use manager::{SessionManager, SessionSettings};
pub use routing::{protected_route, RouteArea, RouteDecision};
pub use state::{AuthStatus, Session};
