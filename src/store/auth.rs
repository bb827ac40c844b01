//! Authentication context for store clients.

/// Capability object holding the credentials a client attaches to requests.
///
/// Threaded explicitly into client constructors so clients can be built and
/// tested without any ambient session state.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    /// An unauthenticated context; requests carry no `Authorization` header.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context carrying a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Build a context from an optional configured token; empty means
    /// anonymous.
    pub fn from_config_token(token: &str) -> Self {
        if token.is_empty() {
            Self::anonymous()
        } else {
            Self::bearer(token)
        }
    }

    /// The bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Apply this context to an outgoing request.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
