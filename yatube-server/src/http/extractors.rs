//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::error::ApiError;
use super::server::AppState;
use crate::db::{SessionRepo, User};

/// Cookie carrying the session key
pub const SESSION_COOKIE: &str = "sessionid";

/// Resolve the session cookie to a user, if any.
async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let user = SessionRepo::new(&state.pool).user_for(cookie.value()).await?;
    Ok(user)
}

/// Authenticated user; anonymous requests are redirected to login
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await? {
            Some(user) => Ok(Self(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| parts.uri.path());
                Err(ApiError::LoginRequired {
                    next: next.to_owned(),
                })
            }
        }
    }
}

/// Requesting user on pages that anonymous visitors may see
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await?))
    }
}

/// Integer post id from the path; anything else is an unmatched route
pub struct ValidPostId(pub i64);

impl<S> FromRequestParts<S> for ValidPostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_owned();
        let no_route = || ApiError::NoRoute { path: path.clone() };

        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| no_route())?;

        // Only plain digits, like an `<int:post_id>` route
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(no_route());
        }
        let id = raw.parse::<i64>().map_err(|_| no_route())?;

        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn echo(ValidPostId(id): ValidPostId) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/posts/{post_id}/", get(echo))
    }

    async fn status_of(uri: &str) -> StatusCode {
        app()
            .oneshot(Request::get(uri).body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap()
            .into_response()
            .status()
    }

    #[tokio::test]
    async fn digits_are_accepted() {
        assert_eq!(status_of("/posts/42/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn non_integer_ids_are_404() {
        assert_eq!(status_of("/posts/abc/").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/posts/-1/").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("/posts/99999999999999999999/").await,
            StatusCode::NOT_FOUND
        );
    }
}
