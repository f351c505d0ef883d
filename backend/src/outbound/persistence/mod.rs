//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Strongly typed errors**: all database errors are mapped to the port
//!   error types.

mod error_mapping;
mod models;
mod pool;
mod schema;
mod search_repository;
mod top_search_repository;
mod user_repository;

pub use pool::{DbPool, PoolConfig, PoolError};
pub use search_repository::DieselSearchRepository;
pub use top_search_repository::DieselTopSearchRepository;
pub use user_repository::DieselUserRepository;
