//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::ImageSearchGateway;
use crate::domain::{OauthLoginService, SearchHistoryService, SessionTokenCodec};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Login and identity-resolution service.
    pub login: Arc<OauthLoginService>,
    /// Search-history service.
    pub history: Arc<SearchHistoryService>,
    /// External image search gateway.
    pub images: Arc<dyn ImageSearchGateway>,
    /// Session token codec shared with the extractor and route guard.
    pub codec: SessionTokenCodec,
    /// Whether session cookies are marked `Secure` (production flag).
    pub cookie_secure: bool,
}
