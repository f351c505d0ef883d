//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and
//! persistence layers, the ports those layers plug into, and the services
//! that orchestrate them. Types are immutable and document their invariants
//! and serde contracts in each type's Rustdoc.

pub mod error;
pub mod history_service;
pub mod login_service;
pub mod ports;
pub mod search;
pub mod session;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::history_service::{
    SearchHistoryService, TOP_SEARCHES_DEFAULT_LIMIT, TOP_SEARCHES_LIMIT_BOUNDS,
};
pub use self::login_service::{AuthenticatedLogin, OauthLoginService, SessionProfile};
pub use self::search::{
    ImageSearchPage, NewSearch, PhotoRecord, SearchQuery, SearchRecord, SearchValidationError,
    TopSearch,
};
pub use self::session::{SESSION_TTL_DAYS, SessionClaims, SessionTokenCodec};
pub use self::user::{OauthProfile, OauthProvider, User, UserId, UserValidationError};

/// Convenient result alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
