//! Port abstraction for the OAuth code-for-profile exchange.
//!
//! An adapter implementing this port owns the full provider conversation:
//! trading the authorization code for an access token, fetching the user-info
//! payload, and normalising it into an [`OauthProfile`]. The domain never
//! sees tokens or raw provider payloads.

use async_trait::async_trait;

use crate::domain::user::{OauthProfile, OauthProvider};

/// Failures raised by OAuth exchange adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OauthExchangeError {
    /// The provider rejected the authorization code.
    #[error("identity provider rejected the authorization code: {message}")]
    InvalidCode {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The provider could not be reached.
    #[error("identity provider request failed: {message}")]
    Transport {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The provider did not answer within the configured deadline.
    #[error("identity provider request timed out: {message}")]
    Timeout {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The provider answered with a non-success status.
    #[error("identity provider returned status {status}: {message}")]
    UpstreamStatus {
        /// HTTP status reported by the provider.
        status: u16,
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The provider payload could not be decoded or normalised.
    #[error("identity provider payload could not be decoded: {message}")]
    Decode {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl OauthExchangeError {
    /// Create an invalid-code error with the given message.
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self::InvalidCode {
            message: message.into(),
        }
    }

    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a timeout error with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create an upstream-status error with the given status and message.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port driving a provider's token and user-info endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OauthExchange: Send + Sync {
    /// Exchange `code` with `provider` and return the normalised profile.
    async fn fetch_profile(
        &self,
        provider: OauthProvider,
        code: &str,
    ) -> Result<OauthProfile, OauthExchangeError>;
}

/// Canned exchange for tests and development wiring.
///
/// Accepts any non-empty code and answers with a fixed profile scoped to the
/// requested provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOauthExchange;

#[async_trait]
impl OauthExchange for FixtureOauthExchange {
    async fn fetch_profile(
        &self,
        provider: OauthProvider,
        code: &str,
    ) -> Result<OauthProfile, OauthExchangeError> {
        if code.is_empty() {
            return Err(OauthExchangeError::invalid_code("empty code"));
        }
        OauthProfile::new(
            provider,
            format!("{provider}-fixture-id"),
            "fixture@example.com",
            "Fixture User",
        )
        .map_err(|err| OauthExchangeError::decode(err.to_string()))
    }
}
