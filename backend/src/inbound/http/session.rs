//! Session cookie handling and the per-request session extractor.
//!
//! The `auth-token` cookie carries the signed session token. It is decoded
//! exactly once per request by the [`SessionContext`] extractor; handlers
//! receive the resolved identity (or its absence) and never re-derive it.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, SessionClaims, UserId};

use super::state::HttpState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth-token";

const SESSION_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Build the session cookie carrying a freshly issued token.
pub fn build_session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(CookieDuration::days(SESSION_COOKIE_MAX_AGE_DAYS))
        .finish()
}

/// Build the cookie that destroys the session: empty value, max-age zero.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// Per-request session state decoded from the cookie.
///
/// Missing, tampered, and expired tokens all read as an absent session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    claims: Option<SessionClaims>,
}

impl SessionContext {
    /// Build a context from already-verified claims; used by tests.
    pub fn from_claims(claims: Option<SessionClaims>) -> Self {
        Self { claims }
    }

    /// The authenticated user id, if a valid session is present.
    pub fn user_id(&self) -> Option<&UserId> {
        self.claims.as_ref().map(SessionClaims::user_id)
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()
            .copied()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .app_data::<web::Data<HttpState>>()
            .and_then(|state| {
                req.cookie(SESSION_COOKIE)
                    .and_then(|cookie| state.codec.verify(cookie.value()))
            });
        ready(Ok(Self { claims }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for cookie attributes and session extraction.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as atest};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{test_state, wrap_state};

    #[rstest]
    fn session_cookie_carries_the_required_attributes() {
        let cookie = build_session_cookie("a-token".to_owned(), true);

        assert_eq!(cookie.name(), "auth-token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
    }

    #[rstest]
    fn clearing_cookie_empties_the_value_and_expires_immediately() {
        let cookie = clear_session_cookie(false);

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[actix_web::test]
    async fn extractor_resolves_a_valid_cookie() {
        let state = test_state();
        let user_id = UserId::random();
        let token = state.codec.issue(&user_id).expect("token issues");
        let app = atest::init_service(App::new().app_data(wrap_state(state)).route(
            "/whoami",
            actix_web::web::get().to(|session: SessionContext| async move {
                let id = session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
            }),
        ))
        .await;

        let req = atest::TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let res = atest::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = atest::read_body(res).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::garbage(Some("not-a-token"))]
    #[actix_web::test]
    async fn absent_or_invalid_cookies_are_unauthorised(#[case] cookie: Option<&str>) {
        let state = test_state();
        let app = atest::init_service(App::new().app_data(wrap_state(state)).route(
            "/whoami",
            actix_web::web::get().to(|session: SessionContext| async move {
                session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            }),
        ))
        .await;

        let mut req = atest::TestRequest::get().uri("/whoami");
        if let Some(value) = cookie {
            req = req.cookie(Cookie::new(SESSION_COOKIE, value));
        }
        let res = atest::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
