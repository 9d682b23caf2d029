//! Route table and authentication guard.
//!
//! Guarded routes need a signed-in user. A signed-out visit is sent to
//! `/login` carrying the requested path, and a successful login returns there.

use serde::{Deserialize, Serialize};

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// The application's pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    Login,
    Register,
    Profile,
    Plants,
    /// `/plants/:id`, id kept as written in the path
    PlantDetail(String),
    NotFound,
}

impl Route {
    /// Resolves a browser path. Query strings, fragments and trailing slashes
    /// are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["profile"] => Self::Profile,
            ["plants"] => Self::Plants,
            ["plants", id] => Self::PlantDetail((*id).to_string()),
            _ => Self::NotFound,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Profile | Self::Plants | Self::PlantDetail(_))
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::Register => "/register".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Plants => "/plants".to_string(),
            Self::PlantDetail(id) => format!("/plants/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }
}

/// What the router should do with a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// The session is still loading; show a spinner and ask again
    Wait,
    /// Go to `/login`, remembering the requested path
    RedirectToLogin { from: String },
}

/// Decides how to handle a visit to `path` for the given session.
pub fn guard(path: &str, session: &Session) -> Navigation {
    let route = Route::parse(path);
    if !route.requires_auth() {
        return Navigation::Render(route);
    }
    if session.is_loading {
        return Navigation::Wait;
    }
    if session.is_signed_in() {
        Navigation::Render(route)
    } else {
        Navigation::RedirectToLogin {
            from: route.path(),
        }
    }
}

/// Where to go after a successful login: the remembered path, else home.
///
/// Paths leading back into the login or register pages fall back to home.
pub fn post_login_destination(from: Option<&str>) -> String {
    match from.map(Route::parse) {
        Some(Route::Login | Route::Register | Route::NotFound) | None => HOME_PATH.to_string(),
        Some(route) => route.path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthUser;

    fn signed_out() -> Session {
        Session {
            current_user: None,
            is_loading: false,
        }
    }

    fn signed_in() -> Session {
        Session {
            current_user: Some(AuthUser {
                id: "uid-1".to_string(),
                email: "fern@greennest.test".to_string(),
                display_name: None,
                photo_url: None,
                created_at: chrono::Utc::now(),
            }),
            is_loading: false,
        }
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/plants/"), Route::Plants);
        assert_eq!(
            Route::parse("/plants/7?tab=care"),
            Route::PlantDetail("7".to_string())
        );
        assert_eq!(Route::parse("/plants/7/edit"), Route::NotFound);
        assert_eq!(Route::parse("/shop"), Route::NotFound);
    }

    #[test]
    fn test_guarded_routes() {
        assert!(Route::Profile.requires_auth());
        assert!(Route::Plants.requires_auth());
        assert!(Route::PlantDetail("1".to_string()).requires_auth());
        assert!(!Route::Home.requires_auth());
        assert!(!Route::Register.requires_auth());
    }

    #[test]
    fn test_signed_out_visit_redirects_with_origin() {
        assert_eq!(
            guard("/plants/7", &signed_out()),
            Navigation::RedirectToLogin {
                from: "/plants/7".to_string()
            }
        );
        assert_eq!(guard("/", &signed_out()), Navigation::Render(Route::Home));
    }

    #[test]
    fn test_loading_session_waits() {
        assert_eq!(guard("/profile", &Session::initializing()), Navigation::Wait);
        assert_eq!(
            guard("/login", &Session::initializing()),
            Navigation::Render(Route::Login)
        );
    }

    #[test]
    fn test_signed_in_renders_guarded_route() {
        assert_eq!(
            guard("/profile", &signed_in()),
            Navigation::Render(Route::Profile)
        );
    }

    #[test]
    fn test_post_login_destination() {
        assert_eq!(post_login_destination(Some("/plants/7")), "/plants/7");
        assert_eq!(post_login_destination(None), "/");
        assert_eq!(post_login_destination(Some("/login")), "/");
    }
}
