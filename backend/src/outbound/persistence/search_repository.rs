//! PostgreSQL-backed `SearchRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{HISTORY_PAGE_SIZE, SearchPersistenceError, SearchRepository};
use crate::domain::{NewSearch, SearchQuery, SearchRecord, UserId};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSearchRow, SearchRow, row_to_search};
use super::pool::{DbPool, PoolError};
use super::schema::searches;

/// Diesel-backed implementation of the search repository port.
#[derive(Clone)]
pub struct DieselSearchRepository {
    pool: DbPool,
}

impl DieselSearchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SearchPersistenceError {
    map_basic_pool_error(error, SearchPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SearchPersistenceError {
    map_basic_diesel_error(
        error,
        SearchPersistenceError::query,
        SearchPersistenceError::connection,
    )
}

fn map_row_error(message: String) -> SearchPersistenceError {
    SearchPersistenceError::query(message)
}

#[async_trait]
impl SearchRepository for DieselSearchRepository {
    async fn record(&self, draft: &NewSearch) -> Result<SearchRecord, SearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewSearchRow {
            id: Uuid::new_v4(),
            user_id: *draft.user_id.as_uuid(),
            query: draft.query.as_ref(),
            image_count: draft.image_count,
            selected_images: &draft.selected_images,
            created_at: Utc::now(),
        };

        let row = diesel::insert_into(searches::table)
            .values(&new_row)
            .returning(SearchRow::as_returning())
            .get_result::<SearchRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_search(row).map_err(map_row_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SearchRecord>, SearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SearchRow> = searches::table
            .filter(searches::user_id.eq(user_id.as_uuid()))
            .order((searches::created_at.desc(), searches::id.desc()))
            .limit(HISTORY_PAGE_SIZE as i64)
            .select(SearchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_search(row).map_err(map_row_error))
            .collect()
    }

    async fn update_selection(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
        selected_images: &[String],
    ) -> Result<Option<SearchRecord>, SearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Two steps on one connection: find the newest matching search the
        // caller owns, then update it by primary key. A concurrent insert
        // between the steps can at worst update the second-newest row, which
        // display ordering tolerates.
        let target: Option<Uuid> = searches::table
            .filter(
                searches::user_id
                    .eq(user_id.as_uuid())
                    .and(searches::query.eq(query.as_ref())),
            )
            .order((searches::created_at.desc(), searches::id.desc()))
            .select(searches::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(target) = target else {
            return Ok(None);
        };

        let row = diesel::update(searches::table.filter(searches::id.eq(target)))
            .set(searches::selected_images.eq(selected_images))
            .returning(SearchRow::as_returning())
            .get_result::<SearchRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_search(row).map(Some).map_err(map_row_error)
    }

    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, SearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(searches::table.filter(searches::user_id.eq(user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }
}
