//! End-to-end search and history flows over the wired application.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use backend::domain::ports::{
    FixtureImageSearchGateway, FixtureOauthExchange, MemorySearchRepository,
    MemoryTopSearchRepository, MemoryUserRepository,
};
use backend::domain::{OauthLoginService, SearchHistoryService, SessionTokenCodec};
use backend::inbound::http::state::HttpState;
use backend::server::build_app;

fn app_state() -> HttpState {
    let codec = SessionTokenCodec::new(Zeroizing::new(b"integration-test-secret".to_vec()));
    HttpState {
        login: Arc::new(OauthLoginService::new(
            Arc::new(FixtureOauthExchange),
            Arc::new(MemoryUserRepository::new()),
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

async fn login_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<
            actix_web::body::EitherBody<actix_web::body::BoxBody>,
        >,
        Error = actix_web::Error,
    >,
    oauth_id: &str,
    name: &str,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({
                "email": format!("{oauth_id}@example.com"),
                "name": name,
                "oauthId": oauth_id,
                "oauthProvider": "github"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "auth-token")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie set")
}

async fn run_search(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<
            actix_web::body::EitherBody<actix_web::body::BoxBody>,
        >,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    term: &str,
) -> Value {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/search")
            .cookie(cookie.clone())
            .set_json(json!({ "term": term }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    test::read_body_json(res).await
}

#[actix_web::test]
async fn searches_aggregate_into_top_searches_across_users() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;
    let grace = login_as(&app, "gh-grace", "Grace").await;

    run_search(&app, &ada, "sunset").await;
    run_search(&app, &ada, "sunset").await;
    run_search(&app, &grace, "sunset").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/top-searches?limit=1")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let entries = body
        .get("topSearches")
        .and_then(Value::as_array)
        .expect("topSearches array");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].get("query").and_then(Value::as_str),
        Some("sunset")
    );
    assert_eq!(entries[0].get("count").and_then(Value::as_i64), Some(3));
}

#[actix_web::test]
async fn history_stays_isolated_per_user() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;
    let grace = login_as(&app, "gh-grace", "Grace").await;

    run_search(&app, &ada, "sunset").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/history")
            .cookie(grace)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("searches").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );
}

#[actix_web::test]
async fn clearing_history_keeps_the_global_aggregate() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;

    run_search(&app, &ada, "sunset").await;
    run_search(&app, &ada, "forest").await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/history")
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let history = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/history")
            .cookie(ada)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(history).await;
    assert_eq!(
        body.get("searches").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );

    let top = test::call_service(
        &app,
        test::TestRequest::get().uri("/top-searches").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(top).await;
    assert_eq!(
        body.get("topSearches")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(2)
    );
}

#[actix_web::test]
async fn selection_round_trips_through_the_recorded_search() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;

    let search = run_search(&app, &ada, "sunset").await;
    let first_result_id = search
        .pointer("/results/0/id")
        .and_then(Value::as_str)
        .expect("result id present")
        .to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/search/selection")
            .cookie(ada.clone())
            .set_json(json!({ "term": "sunset", "selectedImages": [first_result_id] }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let history = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/history")
            .cookie(ada)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(history).await;
    let selected = body
        .pointer("/searches/0/selectedImages")
        .and_then(Value::as_array)
        .expect("selection stored");
    assert_eq!(selected.len(), 1);
}

#[actix_web::test]
async fn combined_history_endpoint_reports_both_sections() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;

    run_search(&app, &ada, "sunset").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/search/history")
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("searches").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
    assert_eq!(
        body.get("topSearches")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(1)
    );
}

#[actix_web::test]
async fn hostile_top_search_limits_stay_bounded() {
    let app = test::init_service(build_app(app_state())).await;
    let ada = login_as(&app, "gh-ada", "Ada").await;
    run_search(&app, &ada, "sunset").await;

    for limit in ["-5", "1000"] {
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/top-searches?limit={limit}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let entries = body
            .get("topSearches")
            .and_then(Value::as_array)
            .expect("topSearches array");
        assert!(entries.len() <= 50);
    }
}
