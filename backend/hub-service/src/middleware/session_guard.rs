//! Session Guard: the first request-scoped decision, ahead of any data
//! access, so protected pages never leak to signed-out visitors.

use axum::response::{IntoResponse, Redirect, Response};

use crate::middleware::auth;

/// Page paths that require a session.
const PROTECTED_PREFIXES: &[&str] = &["/vault", "/groups", "/profile"];

/// Auth pages a signed-in member has no business visiting.
const AUTH_ONLY_PATHS: &[&str] = &["/login", "/register"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectHome,
    RedirectLogin,
}

fn path_is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Pure decision: given the request path and whether a valid session is
/// present, allow, send home, or send to login.
pub fn evaluate(path: &str, authenticated: bool) -> GuardDecision {
    if authenticated && AUTH_ONLY_PATHS.iter().any(|p| path_is_under(path, p)) {
        return GuardDecision::RedirectHome;
    }

    if !authenticated && PROTECTED_PREFIXES.iter().any(|p| path_is_under(path, p)) {
        return GuardDecision::RedirectLogin;
    }

    GuardDecision::Allow
}

/// Outermost middleware layer. A failed token validation counts as
/// unauthenticated; there are no retries and no error surface here.
pub async fn session_guard(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let authenticated = auth::token_from_headers(req.headers())
        .and_then(|token| auth::identity_from_token(&token).ok())
        .is_some();

    match evaluate(req.uri().path(), authenticated) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::RedirectHome => Redirect::to("/").into_response(),
        GuardDecision::RedirectLogin => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_protected_paths_redirect_to_login() {
        assert_eq!(evaluate("/vault", false), GuardDecision::RedirectLogin);
        assert_eq!(evaluate("/vault/docs/1", false), GuardDecision::RedirectLogin);
        assert_eq!(evaluate("/groups", false), GuardDecision::RedirectLogin);
        assert_eq!(evaluate("/profile", false), GuardDecision::RedirectLogin);
    }

    #[test]
    fn authenticated_auth_pages_redirect_home() {
        assert_eq!(evaluate("/login", true), GuardDecision::RedirectHome);
        assert_eq!(evaluate("/register", true), GuardDecision::RedirectHome);
    }

    #[test]
    fn everything_else_passes_through() {
        assert_eq!(evaluate("/", true), GuardDecision::Allow);
        assert_eq!(evaluate("/", false), GuardDecision::Allow);
        assert_eq!(evaluate("/login", false), GuardDecision::Allow);
        assert_eq!(evaluate("/vault", true), GuardDecision::Allow);
        assert_eq!(evaluate("/about", false), GuardDecision::Allow);
    }

    #[test]
    fn prefix_matching_is_segment_aware() {
        // "/vaulted" is not under "/vault"
        assert_eq!(evaluate("/vaulted", false), GuardDecision::Allow);
        assert_eq!(evaluate("/groupsmith", false), GuardDecision::Allow);
    }
}
