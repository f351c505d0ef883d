//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint, the shared error envelope and entity
//! schemas, and the session-cookie security scheme. The generated document
//! backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "auth-token",
                "Signed session token issued by the login endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Photo search backend API",
        description = "HTTP interface for OAuth login, image search, and search history."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::oauth_callback,
        crate::inbound::http::auth::direct_login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::session_profile,
        crate::inbound::http::search::execute_search,
        crate::inbound::http::search::search_page,
        crate::inbound::http::search::save_selection,
        crate::inbound::http::search::history_with_top,
        crate::inbound::http::search::list_history,
        crate::inbound::http::search::clear_history,
        crate::inbound::http::search::top_searches,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::User,
        crate::domain::SearchRecord,
        crate::domain::TopSearch,
        crate::domain::PhotoRecord,
        crate::domain::SessionProfile,
        crate::inbound::http::auth::DirectLoginRequest,
        crate::inbound::http::auth::DirectLoginResponse,
        crate::inbound::http::auth::SuccessResponse,
        crate::inbound::http::search::ExecuteSearchRequest,
        crate::inbound::http::search::ExecuteSearchResponse,
        crate::inbound::http::search::SearchPageResponse,
        crate::inbound::http::search::SaveSelectionRequest,
        crate::inbound::http::search::SaveSelectionResponse,
        crate::inbound::http::search::HistoryResponse,
        crate::inbound::http::search::HistoryWithTopResponse,
        crate::inbound::http::search::TopSearchesResponse,
    )),
    tags(
        (name = "auth", description = "Login, logout, and session inspection"),
        (name = "search", description = "Image search and popularity"),
        (name = "history", description = "Per-user search history")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document structure.

    use super::*;

    #[test]
    fn document_registers_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/auth/{provider}/callback",
            "/auth/login",
            "/auth/logout",
            "/auth/session",
            "/search",
            "/search/selection",
            "/search/history",
            "/history",
            "/top-searches",
        ] {
            assert!(paths.contains_key(path), "document should describe {path}");
        }
    }

    #[test]
    fn document_registers_the_error_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components present");
        assert!(
            components.schemas.keys().any(|name| name.contains("Error")),
            "error schema should be registered"
        );
    }
}
