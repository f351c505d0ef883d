//! Search-history use-cases: recording executions, amending selections, and
//! reading history and popularity.
//!
//! Recording a search touches two stores: the owner-scoped history and the
//! global popularity aggregate. The two writes are treated as one logical
//! unit; a failed aggregate bump after a successful insert surfaces as the
//! operation's error rather than silently undercounting.

use std::sync::Arc;

use tracing::error;

use super::error::Error;
use super::ports::{
    SearchPersistenceError, SearchRepository, TopSearchPersistenceError, TopSearchRepository,
};
use super::search::{NewSearch, SearchQuery, SearchRecord, TopSearch};
use super::user::UserId;

/// Inclusive bounds applied to the top-searches limit.
pub const TOP_SEARCHES_LIMIT_BOUNDS: (i64, i64) = (1, 50);

/// Limit applied when the caller does not name one.
pub const TOP_SEARCHES_DEFAULT_LIMIT: i64 = 5;

/// Search-history service over the history and popularity ports.
#[derive(Clone)]
pub struct SearchHistoryService {
    searches: Arc<dyn SearchRepository>,
    top_searches: Arc<dyn TopSearchRepository>,
}

impl SearchHistoryService {
    /// Create a service over the given repositories.
    pub fn new(
        searches: Arc<dyn SearchRepository>,
        top_searches: Arc<dyn TopSearchRepository>,
    ) -> Self {
        Self {
            searches,
            top_searches,
        }
    }

    /// Record one executed search and bump the popularity aggregate.
    pub async fn save_search(
        &self,
        user_id: UserId,
        query: SearchQuery,
        image_count: i64,
        selected_images: Vec<String>,
    ) -> Result<SearchRecord, Error> {
        let draft = NewSearch {
            user_id,
            query,
            image_count,
            selected_images,
        };
        let record = self
            .searches
            .record(&draft)
            .await
            .map_err(map_search_error)?;

        if let Err(err) = self.top_searches.bump(record.query()).await {
            // The search row exists but the aggregate missed an increment;
            // report it so the undercount is never silent.
            error!(error = %err, query = %record.query(), "top search bump failed after insert");
            return Err(map_top_search_error(err));
        }
        Ok(record)
    }

    /// Amend the selection on the caller's most recent search for `query`.
    pub async fn save_selection(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
        selected_images: Vec<String>,
    ) -> Result<SearchRecord, Error> {
        self.searches
            .update_selection(user_id, query, &selected_images)
            .await
            .map_err(map_search_error)?
            .ok_or_else(|| Error::not_found("no search found for this term"))
    }

    /// The caller's history, newest first, one fixed page.
    pub async fn history_for_user(&self, user_id: &UserId) -> Result<Vec<SearchRecord>, Error> {
        self.searches
            .list_for_user(user_id)
            .await
            .map_err(map_search_error)
    }

    /// The most executed queries, highest count first.
    ///
    /// `limit` is clamped to [`TOP_SEARCHES_LIMIT_BOUNDS`] so a hostile query
    /// parameter cannot request an unbounded result set.
    pub async fn top_searches(&self, limit: i64) -> Result<Vec<TopSearch>, Error> {
        let (min, max) = TOP_SEARCHES_LIMIT_BOUNDS;
        self.top_searches
            .top(limit.clamp(min, max))
            .await
            .map_err(map_top_search_error)
    }

    /// Delete the caller's searches, returning how many went.
    ///
    /// Popularity aggregates keep the counts those searches contributed:
    /// popularity is global, not per-user-reversible.
    pub async fn clear_history(&self, user_id: &UserId) -> Result<u64, Error> {
        self.searches
            .clear_for_user(user_id)
            .await
            .map_err(map_search_error)
    }
}

fn map_search_error(error: SearchPersistenceError) -> Error {
    match error {
        SearchPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("search repository unavailable: {message}"))
        }
        SearchPersistenceError::Query { message } => {
            Error::internal(format!("search repository error: {message}"))
        }
    }
}

fn map_top_search_error(error: TopSearchPersistenceError) -> Error {
    match error {
        TopSearchPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("top search repository unavailable: {message}"))
        }
        TopSearchPersistenceError::Query { message } => {
            Error::internal(format!("top search repository error: {message}"))
        }
    }
}
