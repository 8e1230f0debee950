//! Route guard for the admin area.
//!
//! Maps a requested route and the current [`SessionState`] to the view that
//! should render. Admin content is only reachable once the session is
//! authenticated; while a stored token is still being verified the guard
//! yields [`View::Pending`] so nothing protected flashes on screen.

use std::fmt;

use super::session::SessionState;

/// Navigable locations in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public registration form.
    Registration,
    /// Post-submit confirmation.
    Confirmation,
    /// Admin sign-in form.
    AdminLogin,
    /// Protected admin panel.
    Admin,
}

impl Route {
    /// Path segment used by the web client.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Registration => "/",
            Self::Confirmation => "/confirmation",
            Self::AdminLogin => "/admin/login",
            Self::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What the client should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Registration form.
    Registration,
    /// Confirmation page.
    Confirmation,
    /// Admin sign-in form.
    AdminLogin,
    /// Admin panel.
    AdminPanel,
    /// Placeholder shown while the session is verifying.
    Pending,
}

/// Resolve `route` against the session.
///
/// # Examples
/// ```
/// use portal::domain::{Route, SessionState, View, resolve_view};
///
/// assert_eq!(resolve_view(Route::Admin, SessionState::Anonymous), View::AdminLogin);
/// assert_eq!(resolve_view(Route::Admin, SessionState::Authenticated), View::AdminPanel);
/// ```
pub const fn resolve_view(route: Route, session: SessionState) -> View {
    match (route, session) {
        (Route::Registration, _) => View::Registration,
        (Route::Confirmation, _) => View::Confirmation,
        (Route::Admin | Route::AdminLogin, SessionState::Authenticated) => View::AdminPanel,
        (Route::Admin, SessionState::Verifying) => View::Pending,
        (Route::Admin | Route::AdminLogin, _) => View::AdminLogin,
    }
}
