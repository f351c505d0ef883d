//! Reqwest-backed Unsplash search gateway.
//!
//! Thin proxy over the Unsplash photo-search endpoint: fixed page size,
//! relevance ordering, `Client-ID` header auth, and the shared
//! timeout-and-status error mapping conventions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::ports::{ImageSearchError, ImageSearchGateway};
use crate::domain::{ImageSearchPage, SearchQuery};

use super::dto::UnsplashSearchDto;

const SEARCH_ENDPOINT: &str = "https://api.unsplash.com/search/photos";
const PER_PAGE: u32 = 20;

/// Unsplash search adapter.
pub struct UnsplashSearchGateway {
    client: Client,
    access_key: String,
}

impl UnsplashSearchGateway {
    /// Build a gateway with the given API access key and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSearchError::Configuration`] when the key is blank and
    /// a transport error when the reqwest client cannot be constructed.
    pub fn new(access_key: impl Into<String>, timeout: Duration) -> Result<Self, ImageSearchError> {
        let access_key = access_key.into();
        if access_key.trim().is_empty() {
            return Err(ImageSearchError::configuration(
                "image API access key is not configured",
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ImageSearchError::transport(err.to_string()))?;
        Ok(Self { client, access_key })
    }
}

#[async_trait]
impl ImageSearchGateway for UnsplashSearchGateway {
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<ImageSearchPage, ImageSearchError> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key),
            )
            .query(&[
                ("query", query.as_ref()),
                ("page", &page.to_string()),
                ("per_page", &PER_PAGE.to_string()),
                ("order_by", "relevant"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let dto: UnsplashSearchDto = serde_json::from_slice(&body).map_err(|err| {
            ImageSearchError::decode(format!("invalid image search payload: {err}"))
        })?;
        Ok(dto.into())
    }
}

fn map_transport_error(error: reqwest::Error) -> ImageSearchError {
    if error.is_timeout() {
        ImageSearchError::timeout(error.to_string())
    } else {
        ImageSearchError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> ImageSearchError {
    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ImageSearchError::timeout(message)
        }
        _ => ImageSearchError::upstream_status(status.as_u16(), message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for construction and error mapping.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_access_keys_are_a_configuration_error(#[case] key: &str) {
        let result = UnsplashSearchGateway::new(key, Duration::from_secs(5));
        assert!(matches!(
            result,
            Err(ImageSearchError::Configuration { .. })
        ));
    }

    #[rstest]
    fn a_real_key_builds_a_gateway() {
        let gateway = UnsplashSearchGateway::new("access-key", Duration::from_secs(5));
        assert!(gateway.is_ok());
    }

    #[rstest]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::FORBIDDEN, false)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] is_timeout: bool) {
        let error = map_status_error(status);
        assert_eq!(
            matches!(error, ImageSearchError::Timeout { .. }),
            is_timeout
        );
    }
}
