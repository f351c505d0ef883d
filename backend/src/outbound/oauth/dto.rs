//! Wire DTOs for provider token and user-info payloads.
//!
//! Each provider's JSON shape is decoded into a small DTO and normalised
//! into the domain [`OauthProfile`] by a pure mapping function. Field
//! fallbacks mirror what the providers actually do: GitHub omits `email`
//! for private accounts and `name` for accounts that never set one.

use serde::Deserialize;

use crate::domain::ports::OauthExchangeError;
use crate::domain::{OauthProfile, OauthProvider};

/// Token endpoint response, shared by all three providers.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    /// The access token; absent when the provider rejected the code.
    pub access_token: Option<String>,
}

impl TokenResponseDto {
    /// The access token, or an invalid-code error when the provider
    /// answered 200 without one (GitHub reports bad codes this way).
    pub fn require_access_token(self) -> Result<String, OauthExchangeError> {
        self.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OauthExchangeError::invalid_code("token response carried no access token")
            })
    }
}

/// Google `oauth2/v2/userinfo` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleProfileDto {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl GoogleProfileDto {
    /// Normalise into a domain profile.
    pub fn into_profile(self) -> Result<OauthProfile, OauthExchangeError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| OauthExchangeError::decode("google profile carried no name"))?;
        OauthProfile::new(
            OauthProvider::Google,
            self.id,
            self.email.unwrap_or_default(),
            name,
        )
        .map_err(|err| OauthExchangeError::decode(err.to_string()))
    }
}

/// Facebook Graph `/me` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct FacebookProfileDto {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl FacebookProfileDto {
    /// Normalise into a domain profile.
    pub fn into_profile(self) -> Result<OauthProfile, OauthExchangeError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| OauthExchangeError::decode("facebook profile carried no name"))?;
        OauthProfile::new(
            OauthProvider::Facebook,
            self.id,
            self.email.unwrap_or_default(),
            name,
        )
        .map_err(|err| OauthExchangeError::decode(err.to_string()))
    }
}

/// GitHub `/user` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct GithubProfileDto {
    /// GitHub account ids are numeric on the wire.
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl GithubProfileDto {
    /// Normalise into a domain profile, falling back to `login` when the
    /// account never set a display name and to `email` resolved separately.
    pub fn into_profile(self, email: String) -> Result<OauthProfile, OauthExchangeError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.login);
        OauthProfile::new(OauthProvider::Github, self.id.to_string(), email, name)
            .map_err(|err| OauthExchangeError::decode(err.to_string()))
    }
}

/// One entry of GitHub's `/user/emails` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct GithubEmailDto {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
}

/// Pick the primary email, or the first listed, or empty.
pub(crate) fn pick_github_email(emails: Vec<GithubEmailDto>) -> String {
    emails
        .iter()
        .find(|entry| entry.primary)
        .or_else(|| emails.first())
        .map(|entry| entry.email.clone())
        .unwrap_or_default()
}
