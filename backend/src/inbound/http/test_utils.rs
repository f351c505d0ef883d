//! Shared fixtures for handler tests.

use std::sync::Arc;

use actix_web::web;
use zeroize::Zeroizing;

use crate::domain::ports::{
    FixtureImageSearchGateway, FixtureOauthExchange, MemorySearchRepository, MemoryUserRepository,
    MemoryTopSearchRepository,
};
use crate::domain::{OauthLoginService, SearchHistoryService, SessionTokenCodec};

use super::state::HttpState;

/// Build an [`HttpState`] over in-memory fixtures with a test signing secret.
pub fn test_state() -> HttpState {
    let codec = SessionTokenCodec::new(Zeroizing::new(b"handler-test-secret".to_vec()));
    let users = Arc::new(MemoryUserRepository::new());
    HttpState {
        login: Arc::new(OauthLoginService::new(
            Arc::new(FixtureOauthExchange),
            users,
            codec.clone(),
        )),
        history: Arc::new(SearchHistoryService::new(
            Arc::new(MemorySearchRepository::new()),
            Arc::new(MemoryTopSearchRepository::new()),
        )),
        images: Arc::new(FixtureImageSearchGateway),
        codec,
        cookie_secure: false,
    }
}

/// Wrap state for registration with `App::app_data`.
pub fn wrap_state(state: HttpState) -> web::Data<HttpState> {
    web::Data::new(state)
}
