//! Search, history, and popularity endpoints.
//!
//! ```text
//! POST   /search {"term":"sunset"}
//! GET    /search?q=sunset&page=2
//! POST   /search/selection {"term":"sunset","selectedImages":["id1"]}
//! GET    /search/history
//! GET    /history
//! DELETE /history
//! GET    /top-searches?limit=10
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::ports::ImageSearchError;
use crate::domain::{
    Error, ImageSearchPage, PhotoRecord, SearchQuery, SearchRecord, TOP_SEARCHES_DEFAULT_LIMIT,
    TopSearch,
};

use super::ApiResult;
use super::auth::SuccessResponse;
use super::session::SessionContext;
use super::state::HttpState;

/// Request body for an executed search.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ExecuteSearchRequest {
    /// The literal search term as typed.
    pub term: String,
}

/// Response body for an executed search.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecuteSearchResponse {
    /// The executed term, echoed back.
    pub term: String,
    /// Total results reported by the image API.
    pub count: i64,
    /// First page of results.
    pub results: Vec<PhotoRecord>,
    /// Total pages at the API's fixed page size.
    pub total_pages: i64,
}

/// One page of pass-through search results.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchPageResponse {
    /// Total results across all pages.
    pub total: i64,
    /// Total pages at the API's fixed page size.
    pub total_pages: i64,
    /// Results on this page.
    pub results: Vec<PhotoRecord>,
}

impl From<ImageSearchPage> for SearchPageResponse {
    fn from(page: ImageSearchPage) -> Self {
        Self {
            total: page.total,
            total_pages: page.total_pages,
            results: page.results,
        }
    }
}

fn map_image_error(error: &ImageSearchError) -> Error {
    // Upstream status codes and bodies stay in the log; the client only
    // sees a generic failure.
    error!(error = %error, "image search failed");
    match error {
        ImageSearchError::Timeout { .. } | ImageSearchError::Transport { .. } => {
            Error::service_unavailable("image search unavailable")
        }
        _ => Error::internal("image search failed"),
    }
}

/// Execute a search: proxy the image API, persist the execution, and bump
/// the popularity aggregate.
#[utoipa::path(
    post,
    path = "/search",
    request_body = ExecuteSearchRequest,
    responses(
        (status = 200, description = "Search executed and recorded", body = ExecuteSearchResponse),
        (status = 400, description = "Missing or blank term", body = Error),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["search"],
    operation_id = "executeSearch"
)]
#[post("/search")]
pub async fn execute_search(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ExecuteSearchRequest>,
) -> ApiResult<web::Json<ExecuteSearchResponse>> {
    let user_id = session.require_user_id()?;
    let query = SearchQuery::new(payload.into_inner().term)
        .map_err(|_| Error::invalid_request("term is required"))?;

    let page = state
        .images
        .search(&query, 1)
        .await
        .map_err(|err| map_image_error(&err))?;

    // Recorded once per execution with an empty selection; a later
    // save-selection call amends the record.
    state
        .history
        .save_search(user_id, query.clone(), page.total, Vec::new())
        .await?;

    Ok(web::Json(ExecuteSearchResponse {
        term: query.into(),
        count: page.total,
        results: page.results,
        total_pages: page.total_pages,
    }))
}

/// Query parameters for pass-through pagination.
#[derive(Debug, Deserialize)]
pub struct SearchPageQuery {
    /// The search term.
    q: Option<String>,
    /// 1-based page number; defaults to 1.
    page: Option<String>,
}

/// Paginate against the image API without persisting anything.
#[utoipa::path(
    get,
    path = "/search",
    params(
        ("q" = String, Query, description = "Search term"),
        ("page" = Option<u32>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "One result page", body = SearchPageResponse),
        (status = 400, description = "Missing term or malformed page", body = Error),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["search"],
    operation_id = "searchPage"
)]
#[get("/search")]
pub async fn search_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchPageQuery>,
) -> ApiResult<web::Json<SearchPageResponse>> {
    session.require_user_id()?;
    let SearchPageQuery { q, page } = query.into_inner();
    let term = SearchQuery::new(q.unwrap_or_default())
        .map_err(|_| Error::invalid_request("query parameter q is required"))?;
    let page = match page {
        None => 1,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| Error::invalid_request("page must be a positive integer"))?,
    };

    let results = state
        .images
        .search(&term, page)
        .await
        .map_err(|err| map_image_error(&err))?;
    Ok(web::Json(results.into()))
}

/// Request body for amending a selection.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSelectionRequest {
    /// The term whose most recent search is amended.
    pub term: String,
    /// External result identifiers the user marked.
    pub selected_images: Vec<String>,
}

/// Response body for an amended selection.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveSelectionResponse {
    /// Always `true` on success.
    pub success: bool,
    /// The amended search record.
    pub search: SearchRecord,
}

/// Attach a selection to the caller's most recent search for the term.
#[utoipa::path(
    post,
    path = "/search/selection",
    request_body = SaveSelectionRequest,
    responses(
        (status = 200, description = "Selection saved", body = SaveSelectionResponse),
        (status = 400, description = "Missing or blank term", body = Error),
        (status = 401, description = "No session", body = Error),
        (status = 404, description = "No search for this term", body = Error)
    ),
    tags = ["search"],
    operation_id = "saveSelection"
)]
#[post("/search/selection")]
pub async fn save_selection(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SaveSelectionRequest>,
) -> ApiResult<web::Json<SaveSelectionResponse>> {
    let user_id = session.require_user_id()?;
    let SaveSelectionRequest {
        term,
        selected_images,
    } = payload.into_inner();
    let query =
        SearchQuery::new(term).map_err(|_| Error::invalid_request("term is required"))?;

    let search = state
        .history
        .save_selection(&user_id, &query, selected_images)
        .await?;
    Ok(web::Json(SaveSelectionResponse {
        success: true,
        search,
    }))
}

/// Response body listing the caller's history.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// The caller's searches, newest first.
    pub searches: Vec<SearchRecord>,
}

/// List the caller's search history.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "The caller's history", body = HistoryResponse),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["history"],
    operation_id = "listHistory"
)]
#[get("/history")]
pub async fn list_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<HistoryResponse>> {
    let user_id = session.require_user_id()?;
    let searches = state.history.history_for_user(&user_id).await?;
    Ok(web::Json(HistoryResponse { searches }))
}

/// Clear the caller's search history.
///
/// Popularity aggregates keep the counts the cleared searches contributed.
#[utoipa::path(
    delete,
    path = "/history",
    responses(
        (status = 200, description = "History cleared", body = SuccessResponse),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["history"],
    operation_id = "clearHistory"
)]
#[delete("/history")]
pub async fn clear_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SuccessResponse>> {
    let user_id = session.require_user_id()?;
    state.history.clear_history(&user_id).await?;
    Ok(web::Json(SuccessResponse { success: true }))
}

/// Response body combining history with the global top searches.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryWithTopResponse {
    /// The caller's searches, newest first.
    pub searches: Vec<SearchRecord>,
    /// The most executed queries across all users.
    pub top_searches: Vec<TopSearch>,
}

/// List the caller's history together with the current top searches.
#[utoipa::path(
    get,
    path = "/search/history",
    responses(
        (status = 200, description = "History and top searches", body = HistoryWithTopResponse),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["history"],
    operation_id = "historyWithTopSearches"
)]
#[get("/search/history")]
pub async fn history_with_top(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<HistoryWithTopResponse>> {
    let user_id = session.require_user_id()?;
    let searches = state.history.history_for_user(&user_id).await?;
    let top = state
        .history
        .top_searches(TOP_SEARCHES_DEFAULT_LIMIT)
        .await?;
    Ok(web::Json(HistoryWithTopResponse {
        searches,
        top_searches: top,
    }))
}

/// Query parameters for the top-searches endpoint.
#[derive(Debug, Deserialize)]
pub struct TopSearchesQuery {
    /// Requested number of entries; clamped server-side.
    limit: Option<i64>,
}

/// Response body listing the top searches.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSearchesResponse {
    /// The most executed queries, highest count first.
    pub top_searches: Vec<TopSearch>,
}

/// List the most executed queries across all users.
#[utoipa::path(
    get,
    path = "/top-searches",
    params(
        ("limit" = Option<i64>, Query, description = "Entry count, clamped to [1, 50]; defaults to 5")
    ),
    responses(
        (status = 200, description = "Top searches", body = TopSearchesResponse)
    ),
    tags = ["search"],
    operation_id = "topSearches",
    security([])
)]
#[get("/top-searches")]
pub async fn top_searches(
    state: web::Data<HttpState>,
    query: web::Query<TopSearchesQuery>,
) -> ApiResult<web::Json<TopSearchesResponse>> {
    let limit = query
        .into_inner()
        .limit
        .unwrap_or(TOP_SEARCHES_DEFAULT_LIMIT);
    let top_searches = state.history.top_searches(limit).await?;
    Ok(web::Json(TopSearchesResponse { top_searches }))
}
