//! Search history and popularity aggregates.
//!
//! A [`SearchRecord`] is written once per executed search; the
//! [`TopSearch`] aggregate counts executions per distinct query string
//! across all users. Queries are compared byte-for-byte: no trimming or
//! case-folding is applied, so `"Cats"` and `"cats"` are distinct
//! aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Validation errors returned by search constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchValidationError {
    /// The query string was empty or whitespace-only.
    #[error("search query must not be empty")]
    EmptyQuery,
    /// A top-search aggregate carried a count below one.
    #[error("top search count must be at least 1")]
    CountBelowOne,
}

/// A user-supplied search term, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validate and construct a query from the literal term as typed.
    pub fn new(term: impl Into<String>) -> Result<Self, SearchValidationError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(SearchValidationError::EmptyQuery);
        }
        Ok(Self(term))
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SearchQuery> for String {
    fn from(value: SearchQuery) -> Self {
        value.0
    }
}

impl TryFrom<String> for SearchQuery {
    type Error = SearchValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Draft for a search about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearch {
    /// Owning user.
    pub user_id: UserId,
    /// The executed query.
    pub query: SearchQuery,
    /// Total results reported by the external API, not the number stored.
    pub image_count: i64,
    /// External result identifiers marked by the user; may be empty.
    pub selected_images: Vec<String>,
}

/// A persisted search execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// Store-assigned identifier.
    #[schema(value_type = String)]
    id: Uuid,
    /// Owning user.
    #[schema(value_type = String)]
    user_id: UserId,
    /// The literal search term as typed.
    #[schema(value_type = String, example = "sunset")]
    query: SearchQuery,
    /// Total results reported by the external API.
    image_count: i64,
    /// External result identifiers the user marked.
    selected_images: Vec<String>,
    /// Execution timestamp.
    created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Build a record from validated components.
    pub fn new(
        id: Uuid,
        draft: NewSearch,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            query: draft.query,
            image_count: draft.image_count,
            selected_images: draft.selected_images,
            created_at,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The executed query.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Total results reported by the external API.
    pub fn image_count(&self) -> i64 {
        self.image_count
    }

    /// Identifiers of the results the user marked.
    pub fn selected_images(&self) -> &[String] {
        &self.selected_images
    }

    /// Execution timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the selection with a later "save selection" action.
    pub fn with_selection(mut self, selected_images: Vec<String>) -> Self {
        self.selected_images = selected_images;
        self
    }
}

/// Global popularity counter for one distinct query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSearch {
    /// The exact query string; unique across the aggregate table.
    #[schema(example = "sunset")]
    query: String,
    /// Number of executions across all users, at least 1.
    count: i64,
    /// Timestamp of the most recent execution.
    last_searched: DateTime<Utc>,
}

impl TopSearch {
    /// Build an aggregate, enforcing the count floor.
    pub fn new(
        query: impl Into<String>,
        count: i64,
        last_searched: DateTime<Utc>,
    ) -> Result<Self, SearchValidationError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(SearchValidationError::EmptyQuery);
        }
        if count < 1 {
            return Err(SearchValidationError::CountBelowOne);
        }
        Ok(Self {
            query,
            count,
            last_searched,
        })
    }

    /// The exact query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of executions across all users.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Timestamp of the most recent execution.
    pub fn last_searched(&self) -> DateTime<Utc> {
        self.last_searched
    }
}

/// One photo result as consumed from the external image API.
///
/// The external payload carries many more fields; this is the slice the
/// application cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PhotoRecord {
    /// External result identifier.
    pub id: String,
    /// Direct image URL.
    pub url: String,
    /// Caption, when the API provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Like count reported by the API.
    pub likes: i64,
    /// Download count; omitted by the search endpoint for some plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<i64>,
}

/// One page of external search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSearchPage {
    /// Total results across all pages.
    pub total: i64,
    /// Total pages at the fixed page size.
    pub total_pages: i64,
    /// Results on this page.
    pub results: Vec<PhotoRecord>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for search entity validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn query_rejects_blank_terms(#[case] raw: &str) {
        assert_eq!(
            SearchQuery::new(raw),
            Err(SearchValidationError::EmptyQuery)
        );
    }

    #[test]
    fn query_preserves_the_literal_term() {
        let query = SearchQuery::new("  Cats ").expect("non-blank term");
        assert_eq!(query.as_ref(), "  Cats ");
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn top_search_rejects_counts_below_one(#[case] count: i64) {
        assert_eq!(
            TopSearch::new("sunset", count, Utc::now()),
            Err(SearchValidationError::CountBelowOne)
        );
    }

    #[test]
    fn search_record_serialises_with_camel_case_fields() {
        let draft = NewSearch {
            user_id: UserId::random(),
            query: SearchQuery::new("sunset").expect("valid query"),
            image_count: 120,
            selected_images: vec!["abc".to_owned()],
        };
        let record = SearchRecord::new(Uuid::new_v4(), draft, Utc::now());
        let value = serde_json::to_value(&record).expect("record serialises");

        assert_eq!(value.get("imageCount").and_then(|v| v.as_i64()), Some(120));
        assert!(value.get("selectedImages").is_some());
        assert!(value.get("selected_images").is_none());
    }

    #[test]
    fn with_selection_replaces_marked_images() {
        let draft = NewSearch {
            user_id: UserId::random(),
            query: SearchQuery::new("sunset").expect("valid query"),
            image_count: 1,
            selected_images: Vec::new(),
        };
        let record = SearchRecord::new(Uuid::new_v4(), draft, Utc::now())
            .with_selection(vec!["x1".to_owned(), "x2".to_owned()]);
        assert_eq!(record.selected_images(), ["x1", "x2"]);
    }
}
