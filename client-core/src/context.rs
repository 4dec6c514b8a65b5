use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque union identifier as the server hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionId(pub String);

impl UnionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in member, as decoded from the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub display_name: String,
}

/// Which top-level surface the shell is currently showing. The resolver
/// needs this to suppress the onboarding redirect when already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    Login,
    Onboarding,
    Dashboard,
    Other,
}

/// Session-scoped application context.
///
/// Created once when a session starts and passed explicitly to everything
/// that needs identity or union selection; torn down at sign-out. There is
/// deliberately no global accessor.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub identity: Identity,
    pub active_union: Option<UnionId>,
    pub surface: Surface,
}

impl AppContext {
    /// Begin a session for a freshly authenticated identity.
    pub fn start(identity: Identity) -> Self {
        Self {
            identity,
            active_union: None,
            surface: Surface::Other,
        }
    }

    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    /// Tear the session down. Consumes the context so nothing can keep
    /// reading a signed-out identity.
    pub fn sign_out(self) {
        tracing::info!(user_id = %self.identity.user_id, "session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            display_name: "Sam Reyes".into(),
        }
    }

    #[test]
    fn fresh_context_has_no_selection() {
        let ctx = AppContext::start(identity());
        assert!(ctx.active_union.is_none());
        assert_eq!(ctx.surface, Surface::Other);
    }

    #[test]
    fn sign_out_consumes_the_context() {
        let ctx = AppContext::start(identity());
        ctx.sign_out();
        // `ctx` is moved; continued use would not compile.
    }
}
