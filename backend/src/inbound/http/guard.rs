//! Route guard for the protected page area.
//!
//! The decision itself is a pure function over the request path and session
//! presence; the middleware evaluates it on every matched request (never
//! cached, since a logout can change session state between requests) using
//! the session cookie and the shared token codec.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error as ActixError, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::SessionTokenCodec;

use super::session::SESSION_COOKIE;

/// Prefix of the page area that requires a session.
pub const PROTECTED_PREFIX: &str = "/dashboard";

/// The login page path.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of the guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Redirect to the given location instead of serving the request.
    RedirectTo(&'static str),
}

/// Decide whether `path` may be served given the session state.
///
/// Unauthenticated requests under the protected prefix bounce to the login
/// page; authenticated requests for the login page bounce to the dashboard;
/// everything else is allowed.
pub fn guard(path: &str, session_present: bool) -> GuardDecision {
    let protected = path
        .strip_prefix(PROTECTED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if protected && !session_present {
        GuardDecision::RedirectTo(LOGIN_PATH)
    } else if path == LOGIN_PATH && session_present {
        GuardDecision::RedirectTo(PROTECTED_PREFIX)
    } else {
        GuardDecision::Allow
    }
}

/// Middleware applying [`guard`] to every request.
#[derive(Clone)]
pub struct RouteGuard {
    codec: SessionTokenCodec,
}

impl RouteGuard {
    /// Create a guard sharing the application's token codec.
    pub fn new(codec: SessionTokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service,
            codec: self.codec.clone(),
        }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: S,
    codec: SessionTokenCodec,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session_present = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| self.codec.verify(cookie.value()))
            .is_some();

        match guard(req.path(), session_present) {
            GuardDecision::Allow => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            GuardDecision::RedirectTo(location) => {
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish();
                let res = req.into_response(response).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
