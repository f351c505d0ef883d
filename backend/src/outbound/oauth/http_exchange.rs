//! Reqwest-backed OAuth exchange adapter.
//!
//! One engine drives all three providers, parameterised by the
//! [`ProviderDescriptor`] protocol data: trade the authorization code for an
//! access token (in the encoding the provider mandates), fetch the user-info
//! payload, and normalise it into a domain profile. The adapter owns
//! transport details only: request serialisation, timeout and HTTP error
//! mapping, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{OauthExchange, OauthExchangeError};
use crate::domain::{OauthProfile, OauthProvider};

use super::descriptor::{ProviderDescriptor, TokenRequestStyle};
use super::dto::{
    FacebookProfileDto, GithubEmailDto, GithubProfileDto, GoogleProfileDto, TokenResponseDto,
    pick_github_email,
};

const DEFAULT_USER_AGENT: &str = concat!("photosearch-backend/", env!("CARGO_PKG_VERSION"));

/// Registered client credentials for one provider.
#[derive(Debug, Clone)]
pub struct OauthClientConfig {
    /// OAuth client id (Facebook calls this the app id).
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
}

/// Client credentials for all supported providers.
#[derive(Debug, Clone)]
pub struct OauthClientSet {
    /// Google OAuth 2.0 credentials.
    pub google: OauthClientConfig,
    /// Facebook Login credentials.
    pub facebook: OauthClientConfig,
    /// GitHub OAuth app credentials.
    pub github: OauthClientConfig,
}

impl OauthClientSet {
    /// The credentials registered for `provider`.
    pub fn for_provider(&self, provider: OauthProvider) -> &OauthClientConfig {
        match provider {
            OauthProvider::Google => &self.google,
            OauthProvider::Facebook => &self.facebook,
            OauthProvider::Github => &self.github,
        }
    }
}

/// OAuth exchange adapter performing HTTP requests against the providers.
pub struct HttpOauthExchange {
    client: Client,
    clients: OauthClientSet,
}

impl HttpOauthExchange {
    /// Build an adapter with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(clients: OauthClientSet, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, clients })
    }

    fn token_request(
        &self,
        descriptor: &ProviderDescriptor,
        credentials: &OauthClientConfig,
        code: &str,
    ) -> RequestBuilder {
        match descriptor.token_request_style {
            TokenRequestStyle::FormPost => self.client.post(descriptor.token_endpoint).form(&[
                ("code", code),
                ("client_id", &credentials.client_id),
                ("client_secret", &credentials.client_secret),
                ("redirect_uri", &credentials.redirect_uri),
                ("grant_type", "authorization_code"),
            ]),
            TokenRequestStyle::JsonPost => self
                .client
                .post(descriptor.token_endpoint)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&json!({
                    "client_id": credentials.client_id,
                    "client_secret": credentials.client_secret,
                    "code": code,
                    "redirect_uri": credentials.redirect_uri,
                })),
            TokenRequestStyle::QueryGet => {
                self.client.get(descriptor.token_endpoint).query(&[
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                    ("redirect_uri", credentials.redirect_uri.as_str()),
                    ("code", code),
                ])
            }
        }
    }

    async fn exchange_code(
        &self,
        descriptor: &ProviderDescriptor,
        code: &str,
    ) -> Result<String, OauthExchangeError> {
        let credentials = self.clients.for_provider(descriptor.provider);
        let response: TokenResponseDto = send_json(
            descriptor.provider,
            self.token_request(descriptor, credentials, code),
        )
        .await?;
        response.require_access_token()
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        provider: OauthProvider,
        endpoint: &str,
        access_token: &str,
    ) -> Result<T, OauthExchangeError> {
        send_json(
            provider,
            self.client.get(endpoint).bearer_auth(access_token),
        )
        .await
    }

    async fn google_profile(
        &self,
        descriptor: &ProviderDescriptor,
        access_token: &str,
    ) -> Result<OauthProfile, OauthExchangeError> {
        let dto: GoogleProfileDto = self
            .fetch_json(descriptor.provider, descriptor.profile_endpoint, access_token)
            .await?;
        dto.into_profile()
    }

    async fn facebook_profile(
        &self,
        descriptor: &ProviderDescriptor,
        access_token: &str,
    ) -> Result<OauthProfile, OauthExchangeError> {
        // The Graph API wants the field list and token in the query string.
        let request = self.client.get(descriptor.profile_endpoint).query(&[
            ("fields", "id,name,email"),
            ("access_token", access_token),
        ]);
        let dto: FacebookProfileDto = send_json(descriptor.provider, request).await?;
        dto.into_profile()
    }

    async fn github_profile(
        &self,
        descriptor: &ProviderDescriptor,
        access_token: &str,
    ) -> Result<OauthProfile, OauthExchangeError> {
        let dto: GithubProfileDto = self
            .fetch_json(descriptor.provider, descriptor.profile_endpoint, access_token)
            .await?;

        let email = match (&dto.email, descriptor.email_fallback_endpoint) {
            (Some(email), _) if !email.is_empty() => email.clone(),
            (_, Some(endpoint)) => {
                let emails: Vec<GithubEmailDto> = self
                    .fetch_json(descriptor.provider, endpoint, access_token)
                    .await?;
                pick_github_email(emails)
            }
            _ => String::new(),
        };
        dto.into_profile(email)
    }
}

#[async_trait]
impl OauthExchange for HttpOauthExchange {
    async fn fetch_profile(
        &self,
        provider: OauthProvider,
        code: &str,
    ) -> Result<OauthProfile, OauthExchangeError> {
        let descriptor = ProviderDescriptor::for_provider(provider);
        let access_token = self.exchange_code(&descriptor, code).await?;

        match provider {
            OauthProvider::Google => self.google_profile(&descriptor, &access_token).await,
            OauthProvider::Facebook => self.facebook_profile(&descriptor, &access_token).await,
            OauthProvider::Github => self.github_profile(&descriptor, &access_token).await,
        }
    }
}

async fn send_json<T: DeserializeOwned>(
    provider: OauthProvider,
    request: RequestBuilder,
) -> Result<T, OauthExchangeError> {
    let response = request
        .send()
        .await
        .map_err(|err| map_transport_error(provider, &err))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| map_transport_error(provider, &err))?;
    if !status.is_success() {
        return Err(map_status_error(provider, status, body.as_ref()));
    }

    serde_json::from_slice(&body).map_err(|err| {
        warn!(provider = %provider, error = %err, "provider payload failed to decode");
        OauthExchangeError::decode(format!("invalid provider JSON payload: {err}"))
    })
}

fn map_transport_error(provider: OauthProvider, error: &reqwest::Error) -> OauthExchangeError {
    warn!(provider = %provider, error = %error, "provider request failed");
    if error.is_timeout() {
        OauthExchangeError::timeout(error.to_string())
    } else {
        OauthExchangeError::transport(error.to_string())
    }
}

fn map_status_error(
    provider: OauthProvider,
    status: StatusCode,
    body: &[u8],
) -> OauthExchangeError {
    // Log status context only; provider error bodies may quote the code or
    // token and never leave the adapter in full.
    warn!(
        provider = %provider,
        status = status.as_u16(),
        body_bytes = body.len(),
        "provider returned a non-success status"
    );

    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            OauthExchangeError::invalid_code(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            OauthExchangeError::timeout(message)
        }
        _ => OauthExchangeError::upstream_status(status.as_u16(), message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network exchange mapping helpers.

    use super::*;
    use rstest::rstest;

    fn config(prefix: &str) -> OauthClientConfig {
        OauthClientConfig {
            client_id: format!("{prefix}-id"),
            client_secret: format!("{prefix}-secret"),
            redirect_uri: format!("https://app.example.com/auth/{prefix}/callback"),
        }
    }

    fn client_set() -> OauthClientSet {
        OauthClientSet {
            google: config("google"),
            facebook: config("facebook"),
            github: config("github"),
        }
    }

    #[rstest]
    #[case(OauthProvider::Google)]
    #[case(OauthProvider::Facebook)]
    #[case(OauthProvider::Github)]
    fn client_set_resolves_per_provider(#[case] provider: OauthProvider) {
        let clients = client_set();
        let credentials = clients.for_provider(provider);
        assert!(credentials.client_id.starts_with(provider.as_str()));
    }

    #[rstest]
    #[case::google(OauthProvider::Google, "POST", true, false)]
    #[case::facebook(OauthProvider::Facebook, "GET", false, true)]
    #[case::github(OauthProvider::Github, "POST", false, false)]
    fn token_requests_follow_the_mandated_encoding(
        #[case] provider: OauthProvider,
        #[case] method: &str,
        #[case] form_encoded: bool,
        #[case] code_in_query: bool,
    ) {
        let exchange = HttpOauthExchange::new(client_set(), Duration::from_secs(5))
            .expect("client builds");
        let descriptor = ProviderDescriptor::for_provider(provider);
        let credentials = exchange.clients.for_provider(provider).clone();
        let request = exchange
            .token_request(&descriptor, &credentials, "the-code")
            .build()
            .expect("request builds");

        assert_eq!(request.method().as_str(), method);
        let content_type = request
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert_eq!(
            content_type.contains("application/x-www-form-urlencoded"),
            form_encoded
        );
        assert_eq!(
            request
                .url()
                .query()
                .unwrap_or_default()
                .contains("code=the-code"),
            code_in_query
        );
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, "InvalidCode")]
    #[case(StatusCode::BAD_REQUEST, "InvalidCode")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case(StatusCode::BAD_GATEWAY, "UpstreamStatus")]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(OauthProvider::Google, status, b"{\"error\":\"nope\"}");
        let matched = match expected {
            "InvalidCode" => matches!(error, OauthExchangeError::InvalidCode { .. }),
            "Timeout" => matches!(error, OauthExchangeError::Timeout { .. }),
            "UpstreamStatus" => matches!(error, OauthExchangeError::UpstreamStatus { .. }),
            other => panic!("unsupported expectation: {other}"),
        };
        assert!(matched, "{status} should map to {expected}");
    }

    #[test]
    fn status_errors_never_quote_the_provider_body() {
        let error = map_status_error(
            OauthProvider::Github,
            StatusCode::BAD_GATEWAY,
            b"secret-token-echoed-back",
        );
        assert!(!error.to_string().contains("secret-token-echoed-back"));
    }
}
