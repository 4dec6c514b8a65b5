use hub_service::middleware::session_guard::{evaluate, GuardDecision};

#[test]
fn unauthenticated_vault_redirects_to_login() {
    assert_eq!(evaluate("/vault", false), GuardDecision::RedirectLogin);
}

#[test]
fn authenticated_login_redirects_home() {
    assert_eq!(evaluate("/login", true), GuardDecision::RedirectHome);
}

#[test]
fn unauthenticated_public_paths_pass() {
    assert_eq!(evaluate("/", false), GuardDecision::Allow);
    assert_eq!(evaluate("/login", false), GuardDecision::Allow);
    assert_eq!(evaluate("/register", false), GuardDecision::Allow);
}

#[test]
fn authenticated_protected_paths_pass() {
    for path in ["/vault", "/groups", "/profile", "/vault/docs/2026"] {
        assert_eq!(evaluate(path, true), GuardDecision::Allow, "path {path}");
    }
}

#[test]
fn nested_protected_paths_redirect() {
    for path in ["/groups/abc", "/profile/settings", "/vault/agreements/1"] {
        assert_eq!(
            evaluate(path, false),
            GuardDecision::RedirectLogin,
            "path {path}"
        );
    }
}
