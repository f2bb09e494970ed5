//! Anti-forgery token lookup.
//!
//! Where the token comes from (a page meta tag, a cookie, a config file) is
//! the host's business. The client asks the provider on every request, so a
//! rotated token is picked up without rebuilding anything.

/// Header every outgoing request carries the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Supplies the current CSRF token, or `None` when none is available.
pub trait TokenProvider: Send + Sync {
    fn csrf_token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn csrf_token(&self) -> Option<String> {
        self()
    }
}

/// A token fixed at construction time.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn csrf_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
