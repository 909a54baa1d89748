//! Port interfaces for the token refresh transport

use async_trait::async_trait;
use bakasync_domain::Result;

/// Token material returned by a successful refresh grant.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Outcome of a single wire attempt against the login endpoint.
///
/// The transport reports what the server said; every protocol decision
/// (retry, error taxonomy, persistence) belongs to the session manager.
#[derive(Debug, Clone)]
pub struct RefreshReply {
    /// HTTP status of the response.
    pub status: u16,
    /// Parsed token fields, when the body carried them.
    pub grant: Option<TokenGrant>,
    /// OAuth `error` code, when the body carried one.
    pub error: Option<String>,
    /// OAuth `error_description`, when the body carried one.
    pub error_description: Option<String>,
}

impl RefreshReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Trait for the refresh-grant transport.
///
/// One call is exactly one wire request; implementations must not retry on
/// their own.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// POST a `refresh_token` grant to `{endpoint_url}/api/login`.
    ///
    /// # Errors
    /// Returns `Network` for transport-level failures (timeout, connection);
    /// protocol-level rejections come back as a [`RefreshReply`].
    async fn request_refresh(&self, endpoint_url: &str, refresh_token: &str)
        -> Result<RefreshReply>;
}
