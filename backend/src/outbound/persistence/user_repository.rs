//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! `find_or_create` is race-safe without application locking: the insert
//! carries `ON CONFLICT DO NOTHING` on the `(oauth_id, oauth_provider)`
//! unique index and the winner is read back afterwards, so two concurrent
//! first logins for the same account resolve to one row.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{OauthProfile, User, UserId};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow, row_to_user};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_row_error(message: String) -> UserPersistenceError {
    UserPersistenceError::query(message)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_or_create(&self, profile: &OauthProfile) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            email: profile.email(),
            name: profile.name(),
            oauth_id: profile.provider_id(),
            oauth_provider: profile.provider().as_str(),
            created_at: Utc::now(),
        };

        // Losing the conflict race is fine; the read below returns whichever
        // row won. An existing row is never updated (first-login profile is
        // canonical).
        diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict((users::oauth_id, users::oauth_provider))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let row = users::table
            .filter(
                users::oauth_id
                    .eq(profile.provider_id())
                    .and(users::oauth_provider.eq(profile.provider().as_str())),
            )
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row).map_err(map_row_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose().map_err(map_row_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(error, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn diesel_errors_map_to_query_errors() {
        let error = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
