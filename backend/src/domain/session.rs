//! Signed session tokens.
//!
//! A session is not a stored entity: it is a bearer credential carried in the
//! `auth-token` cookie. The codec signs a compact HS256 token embedding the
//! user id and a seven-day expiry. Verification collapses every failure
//! (missing, tampered, expired) into "no session" so callers treat absence
//! uniformly; the causes are still distinguished in debug-level logs.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::error::Error;
use super::user::UserId;

/// Sessions expire this long after issuance.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id in canonical string form.
    sub: String,
    /// Issuance instant, seconds since the Unix epoch.
    iat: i64,
    /// Expiry instant, seconds since the Unix epoch.
    exp: i64,
}

/// Decoded payload of a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    user_id: UserId,
}

impl SessionClaims {
    /// The authenticated user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Issues and verifies signed session tokens.
///
/// The codec is pure: placing the token in a cookie (and the cookie
/// attributes) is the caller's concern.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionTokenCodec {
    /// Build a codec from the server-held signing secret.
    ///
    /// The secret buffer is wiped once the derived keys are built.
    pub fn new(secret: Zeroizing<Vec<u8>>) -> Self {
        let encoding = EncodingKey::from_secret(&secret);
        let decoding = DecodingKey::from_secret(&secret);
        let validation = Validation::new(Algorithm::HS256);
        Self {
            encoding,
            decoding,
            validation,
        }
    }

    /// Issue a token for `user_id` expiring [`SESSION_TTL_DAYS`] from now.
    pub fn issue(&self, user_id: &UserId) -> Result<String, Error> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the clock read `issued_at`.
    ///
    /// The expiry is `issued_at` plus [`SESSION_TTL_DAYS`]; injectable so
    /// expiry behaviour is testable without a real seven-day wait.
    pub fn issue_at(&self, user_id: &UserId, issued_at: DateTime<Utc>) -> Result<String, Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("failed to sign session token: {err}")))
    }

    /// Validate signature and expiry, returning the claims on success.
    ///
    /// Every failure is reported as `None`; callers cannot (and must not)
    /// distinguish a tampered token from an expired one.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let data = match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(err) => {
                debug!(error = %err, "session token rejected");
                return None;
            }
        };
        match UserId::new(&data.claims.sub) {
            Ok(user_id) => Some(SessionClaims { user_id }),
            Err(err) => {
                debug!(error = %err, "session token carried an invalid subject");
                None
            }
        }
    }
}
