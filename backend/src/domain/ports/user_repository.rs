//! Port abstraction for user persistence adapters and their errors.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::{OauthProfile, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl UserPersistenceError {
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

/// Port for user identity persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the user owning `(provider_id, provider)`, creating it on first
    /// sight.
    ///
    /// Idempotent on the composite key: repeated calls never create
    /// duplicates, and an existing row keeps its first-login `email`/`name`
    /// even when the profile has since drifted.
    async fn find_or_create(&self, profile: &OauthProfile) -> Result<User, UserPersistenceError>;

    /// Fetch a user by local identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}

/// In-memory repository used by handler tests and development wiring.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the repository holds no users.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_or_create(&self, profile: &OauthProfile) -> Result<User, UserPersistenceError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = users.iter().find(|user| {
            user.oauth_id() == profile.provider_id() && user.oauth_provider() == profile.provider()
        }) {
            return Ok(existing.clone());
        }
        let user = User::new(UserId::random(), profile, Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }
}
