//! Route Guard
//!
//! Decides whether the current identity may open a page of the client.

use std::fmt;

use crate::domain::entity::identity::Identity;

/// Client routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Dashboard,
    Goals,
    Admin,
}

impl Route {
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Goals => "/goals",
            Self::Admin => "/admin",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/" => Some(Self::Root),
            "/login" => Some(Self::Login),
            "/dashboard" => Some(Self::Dashboard),
            "/goals" => Some(Self::Goals),
            "/admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Requires a signed-in identity
    #[inline]
    pub const fn is_private(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Goals | Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Guard verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Check `route` for `identity` (`None` when anonymous)
pub fn guard(route: Route, identity: Option<&Identity>) -> RouteDecision {
    match (route, identity) {
        (Route::Root, _) => RouteDecision::Redirect(Route::Login),
        (route, None) if route.is_private() => RouteDecision::Redirect(Route::Login),
        (Route::Admin, Some(identity)) if !identity.is_admin => {
            RouteDecision::Redirect(Route::Dashboard)
        }
        _ => RouteDecision::Allow,
    }
}
