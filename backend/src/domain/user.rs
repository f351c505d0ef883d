//! User identity model.
//!
//! Users exist only as the result of a successful login with an external
//! identity provider. The provider-scoped id together with the provider name
//! forms the natural key; local [`UserId`]s are store-assigned UUIDs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The user id was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The user id was not a valid UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The provider name was not one of the supported providers.
    #[error("unsupported identity provider")]
    UnknownProvider,
    /// The provider-scoped id was empty.
    #[error("provider id must not be empty")]
    EmptyProviderId,
    /// The display name was empty.
    #[error("name must not be empty")]
    EmptyName,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OauthProvider {
    /// Google OAuth 2.0.
    Google,
    /// Facebook Login (Graph API).
    Facebook,
    /// GitHub OAuth apps.
    Github,
}

impl OauthProvider {
    /// Wire-format name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Github => "github",
        }
    }

    /// All supported providers, in registration order.
    pub fn all() -> [Self; 3] {
        [Self::Google, Self::Facebook, Self::Github]
    }
}

impl fmt::Display for OauthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OauthProvider {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            "github" => Ok(Self::Github),
            _ => Err(UserValidationError::UnknownProvider),
        }
    }
}

/// Normalised profile fetched from an identity provider.
///
/// ## Invariants
/// - `provider_id` and `name` are non-empty.
/// - `email` may be empty: some providers withhold it depending on the
///   account's privacy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OauthProfile {
    provider: OauthProvider,
    provider_id: String,
    email: String,
    name: String,
}

impl OauthProfile {
    /// Validate and construct a profile from provider fields.
    pub fn new(
        provider: OauthProvider,
        provider_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let provider_id = provider_id.into();
        if provider_id.trim().is_empty() {
            return Err(UserValidationError::EmptyProviderId);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            provider,
            provider_id,
            email: email.into(),
            name,
        })
    }

    /// Identity provider this profile came from.
    pub fn provider(&self) -> OauthProvider {
        self.provider
    }

    /// Provider-scoped account identifier.
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Account email, possibly empty.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name reported by the provider.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Application user.
///
/// ## Invariants
/// - At most one user exists per `(oauth_id, oauth_provider)` pair; the
///   repository enforces this with a unique index.
/// - `email` and `name` are the values from the first successful login and
///   are never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable local identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    /// Account email; empty when the provider withheld it.
    email: String,
    /// Display name.
    name: String,
    /// Provider-scoped account identifier.
    oauth_id: String,
    /// Identity provider that vouched for this account.
    oauth_provider: OauthProvider,
    /// First-login timestamp.
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated components.
    pub fn new(
        id: UserId,
        profile: &OauthProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: profile.email().to_owned(),
            name: profile.name().to_owned(),
            oauth_id: profile.provider_id().to_owned(),
            oauth_provider: profile.provider(),
            created_at,
        }
    }

    /// Rehydrate a user from stored fields, enforcing invariants.
    pub fn from_stored(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        oauth_id: impl Into<String>,
        oauth_provider: OauthProvider,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        let profile = OauthProfile::new(oauth_provider, oauth_id, email, name)?;
        Ok(Self::new(id, &profile, created_at))
    }

    /// Stable local identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Account email, possibly empty.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider-scoped account identifier.
    pub fn oauth_id(&self) -> &str {
        &self.oauth_id
    }

    /// Identity provider for this account.
    pub fn oauth_provider(&self) -> OauthProvider {
        self.oauth_provider
    }

    /// First-login timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for user identity validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("google", OauthProvider::Google)]
    #[case("facebook", OauthProvider::Facebook)]
    #[case("github", OauthProvider::Github)]
    fn provider_parses_wire_names(#[case] raw: &str, #[case] expected: OauthProvider) {
        let parsed: OauthProvider = raw.parse().expect("known provider");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
    }

    #[rstest]
    #[case("twitter")]
    #[case("")]
    #[case("Google")]
    fn provider_rejects_unknown_names(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<OauthProvider>(),
            Err(UserValidationError::UnknownProvider)
        );
    }

    #[test]
    fn user_id_rejects_non_uuid_input() {
        assert_eq!(UserId::new(""), Err(UserValidationError::EmptyId));
        assert_eq!(
            UserId::new("not-a-uuid"),
            Err(UserValidationError::InvalidId)
        );
    }

    #[test]
    fn profile_allows_empty_email_but_not_empty_name() {
        let ok = OauthProfile::new(OauthProvider::Github, "9942", "", "octocat");
        assert!(ok.is_ok(), "providers may withhold the email");

        let err = OauthProfile::new(OauthProvider::Github, "9942", "a@b.c", "  ");
        assert_eq!(err, Err(UserValidationError::EmptyName));
    }

    #[test]
    fn profile_requires_provider_id() {
        let err = OauthProfile::new(OauthProvider::Google, " ", "a@b.c", "Ada");
        assert_eq!(err, Err(UserValidationError::EmptyProviderId));
    }

    #[test]
    fn user_serialises_with_camel_case_fields() {
        let profile = OauthProfile::new(OauthProvider::Google, "g-1", "ada@example.com", "Ada")
            .expect("valid profile");
        let user = User::new(UserId::random(), &profile, Utc::now());
        let value = serde_json::to_value(&user).expect("user serialises");

        assert_eq!(
            value.get("oauthProvider").and_then(|v| v.as_str()),
            Some("google")
        );
        assert!(value.get("oauthId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("oauth_id").is_none());
    }
}
