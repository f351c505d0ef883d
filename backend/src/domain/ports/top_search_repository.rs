//! Port abstraction for the global query-popularity aggregate.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::search::{SearchQuery, TopSearch};

/// Persistence errors raised by top-search repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopSearchPersistenceError {
    /// Repository connection could not be established.
    #[error("top search repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("top search repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl TopSearchPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for the per-query popularity counter.
///
/// Counter correctness under concurrent searches for the same term relies on
/// the adapter implementing [`TopSearchRepository::bump`] as a single atomic
/// upsert, never a read-modify-write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopSearchRepository: Send + Sync {
    /// Record one more execution of `query`: increment its count and refresh
    /// the last-searched instant, inserting with a count of 1 when the exact
    /// string has never been seen.
    async fn bump(&self, query: &SearchQuery) -> Result<(), TopSearchPersistenceError>;

    /// The `limit` most executed queries, highest count first.
    async fn top(&self, limit: i64) -> Result<Vec<TopSearch>, TopSearchPersistenceError>;
}

/// In-memory aggregate used by handler tests and development wiring.
#[derive(Debug, Default)]
pub struct MemoryTopSearchRepository {
    counts: Mutex<HashMap<String, (i64, DateTime<Utc>)>>,
}

impl MemoryTopSearchRepository {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopSearchRepository for MemoryTopSearchRepository {
    async fn bump(&self, query: &SearchQuery) -> Result<(), TopSearchPersistenceError> {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = counts
            .entry(query.as_ref().to_owned())
            .or_insert((0, Utc::now()));
        entry.0 += 1;
        entry.1 = Utc::now();
        Ok(())
    }

    async fn top(&self, limit: i64) -> Result<Vec<TopSearch>, TopSearchPersistenceError> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut aggregates = counts
            .iter()
            .map(|(query, (count, last_searched))| {
                TopSearch::new(query.clone(), *count, *last_searched)
                    .map_err(|err| TopSearchPersistenceError::query(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        aggregates.sort_by(|a, b| {
            b.count()
                .cmp(&a.count())
                .then_with(|| b.last_searched().cmp(&a.last_searched()))
        });
        aggregates.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(aggregates)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory popularity aggregate.

    use super::*;
    use rstest::rstest;

    fn query(term: &str) -> SearchQuery {
        SearchQuery::new(term).expect("valid term")
    }

    #[rstest]
    #[tokio::test]
    async fn three_bumps_yield_a_count_of_three() {
        let repo = MemoryTopSearchRepository::new();
        for _ in 0..3 {
            repo.bump(&query("sunset")).await.expect("bump succeeds");
        }

        let top = repo.top(1).await.expect("read succeeds");
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query(), "sunset");
        assert_eq!(top[0].count(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn queries_differing_only_in_case_are_distinct() {
        let repo = MemoryTopSearchRepository::new();
        repo.bump(&query("Cats")).await.expect("bump succeeds");
        repo.bump(&query("cats")).await.expect("bump succeeds");

        let top = repo.top(10).await.expect("read succeeds");
        assert_eq!(top.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn top_orders_by_count_descending_and_respects_the_limit() {
        let repo = MemoryTopSearchRepository::new();
        for _ in 0..2 {
            repo.bump(&query("sunset")).await.expect("bump succeeds");
        }
        for _ in 0..5 {
            repo.bump(&query("forest")).await.expect("bump succeeds");
        }
        repo.bump(&query("harbour")).await.expect("bump succeeds");

        let top = repo.top(2).await.expect("read succeeds");
        let terms: Vec<&str> = top.iter().map(TopSearch::query).collect();
        assert_eq!(terms, ["forest", "sunset"]);
    }
}
