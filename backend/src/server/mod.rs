//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    FixtureImageSearchGateway, ImageSearchGateway, MemorySearchRepository,
    MemoryTopSearchRepository, MemoryUserRepository, OauthExchange, SearchRepository,
    TopSearchRepository, UserRepository,
};
use crate::domain::{OauthLoginService, SearchHistoryService, SessionTokenCodec};
use crate::inbound::http::guard::RouteGuard;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, search};
use crate::middleware::trace::Trace;
use crate::outbound::images::UnsplashSearchGateway;
use crate::outbound::oauth::HttpOauthExchange;
use crate::outbound::persistence::{
    DbPool, DieselSearchRepository, DieselTopSearchRepository, DieselUserRepository, PoolConfig,
};

/// Build the handler state from configuration, choosing database-backed
/// adapters when a pool is available and in-memory stores otherwise.
pub async fn build_http_state(config: &AppConfig) -> std::io::Result<HttpState> {
    let codec = SessionTokenCodec::new(config.signing_secret.clone());

    let (users, searches, top_searches): (
        Arc<dyn UserRepository>,
        Arc<dyn SearchRepository>,
        Arc<dyn TopSearchRepository>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            info!("using PostgreSQL persistence");
            (
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselSearchRepository::new(pool.clone())),
                Arc::new(DieselTopSearchRepository::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores (dev only)");
            (
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemorySearchRepository::new()),
                Arc::new(MemoryTopSearchRepository::new()),
            )
        }
    };

    let exchange: Arc<dyn OauthExchange> =
        Arc::new(
            HttpOauthExchange::new(config.oauth_clients.clone(), config.outbound_timeout)
                .map_err(|err| std::io::Error::other(format!("oauth client: {err}")))?,
        );

    let images: Arc<dyn ImageSearchGateway> =
        match UnsplashSearchGateway::new(config.unsplash_access_key.clone(), config.outbound_timeout)
        {
            Ok(gateway) => Arc::new(gateway),
            Err(err) => {
                warn!(error = %err, "falling back to the fixture image gateway (dev only)");
                Arc::new(FixtureImageSearchGateway)
            }
        };

    Ok(HttpState {
        login: Arc::new(OauthLoginService::new(exchange, users, codec.clone())),
        history: Arc::new(SearchHistoryService::new(searches, top_searches)),
        images,
        codec,
        cookie_secure: config.cookie_secure,
    })
}

/// Build the Actix application over the given handler state.
///
/// The route guard and trace middleware wrap every request; Swagger UI is
/// mounted in debug builds only.
pub fn build_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let guard = RouteGuard::new(state.codec.clone());

    let app = App::new()
        .app_data(web::Data::new(state))
        .wrap(guard)
        .wrap(Trace)
        .service(auth::oauth_callback)
        .service(auth::direct_login)
        .service(auth::logout)
        .service(auth::session_profile)
        .service(search::execute_search)
        .service(search::search_page)
        .service(search::save_selection)
        .service(search::history_with_top)
        .service(search::list_history)
        .service(search::clear_history)
        .service(search::top_searches);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
