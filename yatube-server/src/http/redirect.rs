//! Redirect helpers
//!
//! Form endpoints answer with `302 Found`, like a classic server-rendered
//! site, so clients follow up with a GET.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Where anonymous users are sent
pub const LOGIN_URL: &str = "/auth/login/";

/// Landing page after login and signup
pub const DEFAULT_REDIRECT: &str = "/";

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

/// Login URL carrying the page to come back to.
///
/// Slashes in `next` stay readable: `/auth/login/?next=/create/`.
pub fn login_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{LOGIN_URL}?next={encoded}")
}

/// Accept only local absolute paths as a post-login target.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_REDIRECT,
    }
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_keeps_slashes() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_url("/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/posts/1/")), "/posts/1/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn found_sets_location() {
        let response = found("/posts/3/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/posts/3/");
    }

    #[test]
    fn urls() {
        assert_eq!(profile_url("User1"), "/profile/User1/");
        assert_eq!(post_url(12), "/posts/12/");
    }
}
