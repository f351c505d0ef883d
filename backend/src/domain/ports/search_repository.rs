//! Port abstraction for search-history persistence adapters.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::search::{NewSearch, SearchQuery, SearchRecord};
use crate::domain::user::UserId;

/// Every history read path returns at most this many records, newest first.
pub const HISTORY_PAGE_SIZE: usize = 20;

/// Persistence errors raised by search repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchPersistenceError {
    /// Repository connection could not be established.
    #[error("search repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("search repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl SearchPersistenceError {
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

/// Port for persisting and reading a user's search history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// Insert a new search execution and return the stored record.
    async fn record(&self, draft: &NewSearch) -> Result<SearchRecord, SearchPersistenceError>;

    /// All history for a user, newest first, capped at
    /// [`HISTORY_PAGE_SIZE`] records.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SearchRecord>, SearchPersistenceError>;

    /// Replace the selection on the caller's most recent search for `query`.
    ///
    /// Returns `None` when the user has no search for that term; searches
    /// owned by other users are never touched.
    async fn update_selection(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
        selected_images: &[String],
    ) -> Result<Option<SearchRecord>, SearchPersistenceError>;

    /// Delete all searches owned by `user_id`, returning how many went.
    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, SearchPersistenceError>;
}

/// In-memory repository used by handler tests and development wiring.
#[derive(Debug, Default)]
pub struct MemorySearchRepository {
    searches: Mutex<Vec<SearchRecord>>,
}

impl MemorySearchRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchRepository for MemorySearchRepository {
    async fn record(&self, draft: &NewSearch) -> Result<SearchRecord, SearchPersistenceError> {
        let record = SearchRecord::new(Uuid::new_v4(), draft.clone(), Utc::now());
        self.searches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SearchRecord>, SearchPersistenceError> {
        let searches = self.searches.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(searches
            .iter()
            .rev()
            .filter(|record| record.user_id() == user_id)
            .take(HISTORY_PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn update_selection(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
        selected_images: &[String],
    ) -> Result<Option<SearchRecord>, SearchPersistenceError> {
        let mut searches = self.searches.lock().unwrap_or_else(PoisonError::into_inner);
        let target = searches
            .iter_mut()
            .rev()
            .find(|record| record.user_id() == user_id && record.query() == query);
        match target {
            Some(record) => {
                *record = record.clone().with_selection(selected_images.to_vec());
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, SearchPersistenceError> {
        let mut searches = self.searches.lock().unwrap_or_else(PoisonError::into_inner);
        let before = searches.len();
        searches.retain(|record| record.user_id() != user_id);
        Ok((before - searches.len()) as u64)
    }
}
