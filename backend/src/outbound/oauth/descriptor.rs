//! Per-provider protocol descriptors.
//!
//! The three supported providers share one exchange engine; everything that
//! differs between them — endpoints, the token-request encoding each one
//! mandates, and the email fallback — lives in a data descriptor so the
//! engine stays a single code path.

use crate::domain::OauthProvider;

/// How a provider's token endpoint expects the exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequestStyle {
    /// Form-encoded POST (Google).
    FormPost,
    /// JSON POST with an `Accept: application/json` header (GitHub).
    JsonPost,
    /// GET with the parameters in the query string (Facebook Graph).
    QueryGet,
}

/// Protocol description for one identity provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    /// The provider this descriptor drives.
    pub provider: OauthProvider,
    /// Token endpoint URL.
    pub token_endpoint: &'static str,
    /// Encoding the token endpoint mandates.
    pub token_request_style: TokenRequestStyle,
    /// User-info endpoint URL.
    pub profile_endpoint: &'static str,
    /// Endpoint listing the account's email addresses, for providers whose
    /// profile payload may omit the email.
    pub email_fallback_endpoint: Option<&'static str>,
}

impl ProviderDescriptor {
    /// The descriptor for `provider`.
    pub fn for_provider(provider: OauthProvider) -> Self {
        match provider {
            OauthProvider::Google => Self {
                provider,
                token_endpoint: "https://oauth2.googleapis.com/token",
                token_request_style: TokenRequestStyle::FormPost,
                profile_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo",
                email_fallback_endpoint: None,
            },
            OauthProvider::Facebook => Self {
                provider,
                token_endpoint: "https://graph.facebook.com/v18.0/oauth/access_token",
                token_request_style: TokenRequestStyle::QueryGet,
                profile_endpoint: "https://graph.facebook.com/me",
                email_fallback_endpoint: None,
            },
            OauthProvider::Github => Self {
                provider,
                token_endpoint: "https://github.com/login/oauth/access_token",
                token_request_style: TokenRequestStyle::JsonPost,
                profile_endpoint: "https://api.github.com/user",
                email_fallback_endpoint: Some("https://api.github.com/user/emails"),
            },
        }
    }
}
