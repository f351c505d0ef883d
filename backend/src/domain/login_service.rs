//! Login use-cases: OAuth code exchange, identity resolution, and session
//! issuance.
//!
//! The service drives the per-provider exchange adapter, resolves the
//! normalised profile into a local user, and signs the session token the HTTP
//! layer places in the cookie. Identity resolution is idempotent on
//! `(provider_id, provider)` and never refreshes a stored profile.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::error::Error;
use super::ports::{OauthExchange, OauthExchangeError, UserPersistenceError, UserRepository};
use super::session::SessionTokenCodec;
use super::user::{OauthProfile, OauthProvider, User, UserId};

/// Outcome of a successful login: the resolved user and a fresh session
/// token the caller must place in the session cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedLogin {
    /// The resolved (possibly just created) user.
    pub user: User,
    /// Signed session token for the cookie.
    pub token: String,
}

/// Non-sensitive profile slice backing the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    /// Stable local identifier.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Account email; empty when the provider withheld it.
    pub email: String,
    /// Identity provider that vouched for this account.
    pub oauth_provider: OauthProvider,
}

/// Login and identity-resolution service.
#[derive(Clone)]
pub struct OauthLoginService {
    exchange: Arc<dyn OauthExchange>,
    users: Arc<dyn UserRepository>,
    codec: SessionTokenCodec,
}

impl OauthLoginService {
    /// Create a service over the given exchange adapter and user store.
    pub fn new(
        exchange: Arc<dyn OauthExchange>,
        users: Arc<dyn UserRepository>,
        codec: SessionTokenCodec,
    ) -> Self {
        Self {
            exchange,
            users,
            codec,
        }
    }

    /// Complete an OAuth callback: exchange the code, resolve the user, and
    /// issue a session.
    pub async fn login_with_code(
        &self,
        provider: OauthProvider,
        code: &str,
    ) -> Result<AuthenticatedLogin, Error> {
        let profile = self
            .exchange
            .fetch_profile(provider, code)
            .await
            .map_err(|err| map_exchange_error(provider, err))?;
        self.resolve_and_issue(&profile).await
    }

    /// Log in with already-verified profile fields, bypassing the provider
    /// conversation.
    pub async fn direct_login(&self, profile: &OauthProfile) -> Result<AuthenticatedLogin, Error> {
        self.resolve_and_issue(profile).await
    }

    /// Profile slice for an authenticated session.
    pub async fn session_profile(&self, user_id: &UserId) -> Result<SessionProfile, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(SessionProfile {
            user_id: *user.id(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            oauth_provider: user.oauth_provider(),
        })
    }

    async fn resolve_and_issue(&self, profile: &OauthProfile) -> Result<AuthenticatedLogin, Error> {
        let user = self
            .users
            .find_or_create(profile)
            .await
            .map_err(map_user_error)?;
        let token = self.codec.issue(user.id())?;
        Ok(AuthenticatedLogin { user, token })
    }
}

fn map_exchange_error(provider: OauthProvider, error: OauthExchangeError) -> Error {
    // Provider error bodies stay in the server log; clients only ever see a
    // generic failure.
    warn!(provider = %provider, error = %error, "oauth exchange failed");
    match error {
        OauthExchangeError::InvalidCode { .. } => {
            Error::unauthorized("identity provider rejected the login")
        }
        OauthExchangeError::Transport { .. } | OauthExchangeError::Timeout { .. } => {
            Error::service_unavailable("identity provider unreachable")
        }
        OauthExchangeError::UpstreamStatus { .. } | OauthExchangeError::Decode { .. } => {
            Error::internal("identity provider exchange failed")
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}
