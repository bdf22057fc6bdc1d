//! HTTP Basic authentication for the admin routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::ApiError;

/// The single administrator account.
#[derive(Clone)]
pub struct Credentials {
    inner: Arc<(String, String)>,
}

impl Credentials {
    pub fn new(
        username: &str,
        password: &str,
    ) -> Self {
        Self {
            inner: Arc::new((username.to_string(), password.to_string())),
        }
    }

    /// Compares both parts in constant time. Both comparisons always run.
    pub fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> bool {
        let (expected_user, expected_pass) = &*self.inner;
        let user_match = username.as_bytes().ct_eq(expected_user.as_bytes());
        let pass_match = password.as_bytes().ct_eq(expected_pass.as_bytes());
        bool::from(user_match & pass_match)
    }

    /// Checks an `Authorization` header value.
    pub fn verify_header(
        &self,
        header: &str,
    ) -> bool {
        match decode_basic(header) {
            Some((username, password)) => self.verify(&username, &password),
            None => false,
        }
    }
}

/// Splits `Basic <base64(user:pass)>` into its parts. The scheme name is
/// case-insensitive and the password may itself contain colons.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware rejecting requests without valid admin credentials.
pub async fn require_basic_auth(
    State(credentials): State<Credentials>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|header| credentials.verify_header(header));

    if !authorized {
        warn!(path = %request.uri().path(), "rejected admin request");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
