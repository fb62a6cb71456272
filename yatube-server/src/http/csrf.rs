//! Double-submit CSRF protection
//!
//! Every client gets a random `csrftoken` cookie. Unsafe requests must echo
//! it back in the `X-CSRFToken` header or, for urlencoded forms, in the
//! `csrfmiddlewaretoken` field.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use super::error::ApiError;
use super::forms::form_field;
use super::server::AppState;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "x-csrftoken";
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Token for the current request, exposed to form contexts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    fn is_well_formed(value: &str) -> bool {
        (16..=64).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| ApiError::internal("CSRF middleware not installed"))
    }
}

fn is_unsafe(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_urlencoded(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Middleware issuing the CSRF cookie and checking unsafe requests.
pub async fn csrf_protect(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| CsrfToken::is_well_formed(v))
        .map(CsrfToken);

    let mut request = request;
    if state.config.enforce_csrf && is_unsafe(request.method()) {
        let Some(expected) = &existing else {
            return ApiError::CsrfFailed {
                reason: "CSRF cookie not set",
            }
            .into_response();
        };

        let (submitted, rebuilt) = match submitted_token(request, state.config.body_limit).await {
            Ok(pair) => pair,
            Err(e) => return e.into_response(),
        };
        request = rebuilt;

        if submitted.as_deref() != Some(expected.as_str()) {
            return ApiError::CsrfFailed {
                reason: "CSRF token missing or incorrect",
            }
            .into_response();
        }
    }

    let token = existing.clone().unwrap_or_else(CsrfToken::generate);
    request.extensions_mut().insert(token.clone());

    let response = next.run(request).await;
    if existing.is_some() {
        return response;
    }

    let cookie = Cookie::build((CSRF_COOKIE, token.0))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), response).into_response()
}

/// Pull the submitted token from the header or the urlencoded body.
///
/// The body is buffered and handed back so the handler can still read it.
async fn submitted_token(
    request: Request,
    limit: usize,
) -> Result<(Option<String>, Request), ApiError> {
    if let Some(value) = request.headers().get(CSRF_HEADER) {
        let token = value.to_str().ok().map(str::to_owned);
        return Ok((token, request));
    }

    if !is_urlencoded(&request) {
        return Ok((None, request));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|e| ApiError::BadRequest {
        message: format!("failed to read request body: {e}"),
    })?;
    let token = form_field(&bytes, CSRF_FIELD);

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}
