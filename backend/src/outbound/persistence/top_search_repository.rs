//! PostgreSQL-backed `TopSearchRepository` implementation using Diesel ORM.
//!
//! The bump is a single `INSERT ... ON CONFLICT ... DO UPDATE` so concurrent
//! searches for the same term never lose increments; there is no
//! read-modify-write anywhere in this adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TopSearchPersistenceError, TopSearchRepository};
use crate::domain::{SearchQuery, TopSearch};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{TopSearchRow, row_to_top_search};
use super::pool::{DbPool, PoolError};
use super::schema::top_searches;

/// Diesel-backed implementation of the top-search repository port.
#[derive(Clone)]
pub struct DieselTopSearchRepository {
    pool: DbPool,
}

impl DieselTopSearchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TopSearchPersistenceError {
    map_basic_pool_error(error, TopSearchPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TopSearchPersistenceError {
    map_basic_diesel_error(
        error,
        TopSearchPersistenceError::query,
        TopSearchPersistenceError::connection,
    )
}

#[async_trait]
impl TopSearchRepository for DieselTopSearchRepository {
    async fn bump(&self, query: &SearchQuery) -> Result<(), TopSearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = Utc::now();

        diesel::insert_into(top_searches::table)
            .values((
                top_searches::query.eq(query.as_ref()),
                top_searches::count.eq(1_i64),
                top_searches::last_searched.eq(now),
            ))
            .on_conflict(top_searches::query)
            .do_update()
            .set((
                top_searches::count.eq(top_searches::count + 1),
                top_searches::last_searched.eq(now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn top(&self, limit: i64) -> Result<Vec<TopSearch>, TopSearchPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TopSearchRow> = top_searches::table
            .order((
                top_searches::count.desc(),
                top_searches::last_searched.desc(),
            ))
            .limit(limit)
            .select(TopSearchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_top_search(row).map_err(TopSearchPersistenceError::query))
            .collect()
    }
}
