//! Diesel row structs and validated row-to-domain conversions.
//!
//! Rows are internal to the persistence layer; the domain only ever sees
//! validated entities. A row that fails validation (for example an unknown
//! provider name written by another tool) surfaces as a query error rather
//! than a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{NewSearch, OauthProvider, SearchRecord, TopSearch, User, UserId};

use super::schema::{searches, top_searches, users};

/// Queryable row for user accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub oauth_id: String,
    pub oauth_provider: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for user accounts.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub oauth_id: &'a str,
    pub oauth_provider: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Convert a database row into a validated domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, String> {
    let UserRow {
        id,
        email,
        name,
        oauth_id,
        oauth_provider,
        created_at,
    } = row;

    let provider: OauthProvider = oauth_provider
        .parse()
        .map_err(|_| format!("unknown provider in users row: {oauth_provider}"))?;
    User::from_stored(
        UserId::from_uuid(id),
        email,
        name,
        oauth_id,
        provider,
        created_at,
    )
    .map_err(|err| err.to_string())
}

/// Queryable row for executed searches.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = searches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SearchRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub image_count: i64,
    pub selected_images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for executed searches.
#[derive(Debug, Insertable)]
#[diesel(table_name = searches)]
pub(crate) struct NewSearchRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: &'a str,
    pub image_count: i64,
    pub selected_images: &'a [String],
    pub created_at: DateTime<Utc>,
}

/// Convert a database row into a validated domain search record.
pub(crate) fn row_to_search(row: SearchRow) -> Result<SearchRecord, String> {
    let SearchRow {
        id,
        user_id,
        query,
        image_count,
        selected_images,
        created_at,
    } = row;

    let draft = NewSearch {
        user_id: UserId::from_uuid(user_id),
        query: query.try_into().map_err(
            |err: crate::domain::SearchValidationError| {
                format!("invalid query in searches row: {err}")
            },
        )?,
        image_count,
        selected_images,
    };
    Ok(SearchRecord::new(id, draft, created_at))
}

/// Queryable row for popularity counters.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = top_searches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TopSearchRow {
    pub query: String,
    pub count: i64,
    pub last_searched: DateTime<Utc>,
}

/// Convert a database row into a validated domain aggregate.
pub(crate) fn row_to_top_search(row: TopSearchRow) -> Result<TopSearch, String> {
    TopSearch::new(row.query, row.count, row.last_searched).map_err(|err| err.to_string())
}
