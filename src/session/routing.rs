//! Redirect decisions driven by the authentication status

use super::AuthStatus;

/// Where the current screen lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteArea {
    /// Login and registration screens
    Auth,
    /// Everything that needs a signed-in user
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Startup check still running; render nothing yet
    Wait,
    Stay,
    ToLogin,
    ToHome,
}

/// Decide whether the current area fits the authentication status.
///
/// `Unknown` always waits, so a not-yet-checked session never flashes the login screen.
pub fn protected_route(status: AuthStatus, area: RouteArea) -> RouteDecision {
    match (status, area) {
        (AuthStatus::Unknown, _) => RouteDecision::Wait,
        (AuthStatus::Unauthenticated, RouteArea::Protected) => RouteDecision::ToLogin,
        (AuthStatus::Authenticated, RouteArea::Auth) => RouteDecision::ToHome,
        _ => RouteDecision::Stay,
    }
}
