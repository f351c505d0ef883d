//! Domain ports and supporting types for the hexagonal boundary.

mod image_search_gateway;
mod oauth_exchange;
mod search_repository;
mod top_search_repository;
mod user_repository;

#[cfg(test)]
pub use image_search_gateway::MockImageSearchGateway;
pub use image_search_gateway::{FixtureImageSearchGateway, ImageSearchError, ImageSearchGateway};
#[cfg(test)]
pub use oauth_exchange::MockOauthExchange;
pub use oauth_exchange::{FixtureOauthExchange, OauthExchange, OauthExchangeError};
#[cfg(test)]
pub use search_repository::MockSearchRepository;
pub use search_repository::{
    HISTORY_PAGE_SIZE, MemorySearchRepository, SearchPersistenceError, SearchRepository,
};
#[cfg(test)]
pub use top_search_repository::MockTopSearchRepository;
pub use top_search_repository::{
    MemoryTopSearchRepository, TopSearchPersistenceError, TopSearchRepository,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{MemoryUserRepository, UserPersistenceError, UserRepository};
