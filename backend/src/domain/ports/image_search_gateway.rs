//! Port abstraction for the external stock-photo search API.

use async_trait::async_trait;

use crate::domain::search::{ImageSearchPage, PhotoRecord, SearchQuery};

/// Failures raised by image search adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageSearchError {
    /// The image API could not be reached.
    #[error("image search request failed: {message}")]
    Transport {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The image API did not answer within the configured deadline.
    #[error("image search request timed out: {message}")]
    Timeout {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The image API answered with a non-success status.
    #[error("image search returned status {status}: {message}")]
    UpstreamStatus {
        /// HTTP status reported by the image API.
        status: u16,
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The image API payload could not be decoded.
    #[error("image search payload could not be decoded: {message}")]
    Decode {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The adapter is missing required configuration.
    #[error("image search misconfigured: {message}")]
    Configuration {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl ImageSearchError {
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

    /// Create a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Port for one page of external photo search results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearchGateway: Send + Sync {
    /// Fetch one result page for `query`; pages are 1-based.
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<ImageSearchPage, ImageSearchError>;
}

/// Canned gateway for tests and development wiring.
///
/// Answers every query with the same three-photo page.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureImageSearchGateway;

#[async_trait]
impl ImageSearchGateway for FixtureImageSearchGateway {
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<ImageSearchPage, ImageSearchError> {
        let results = (1..=3)
            .map(|n| PhotoRecord {
                id: format!("fixture-{page}-{n}"),
                url: format!("https://images.example.com/{}/{n}", query.as_ref()),
                description: Some(format!("{} #{n}", query.as_ref())),
                likes: i64::from(n * 10),
                downloads: Some(i64::from(n * 100)),
            })
            .collect();
        Ok(ImageSearchPage {
            total: 3,
            total_pages: 1,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the fixture gateway.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_page_reports_its_totals() {
        let query = SearchQuery::new("sunset").expect("valid term");
        let page = FixtureImageSearchGateway
            .search(&query, 1)
            .await
            .expect("fixture search succeeds");
        assert_eq!(page.total, 3);
        assert_eq!(page.results.len(), 3);
        assert!(page.results[0].url.contains("sunset"));
    }
}
