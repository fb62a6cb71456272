//! Account endpoints
//!
//! Endpoints:
//! - GET|POST /auth/signup/ - create an account
//! - GET|POST /auth/login/  - start a session (sets `sessionid`)
//! - GET|POST /auth/logout/ - end the session

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{authenticate, hash_password};
use crate::db::{DbError, NewUser, SessionRepo, UserRepo};
use crate::http::csrf::CsrfToken;
use crate::http::error::ApiError;
use crate::http::extractors::SESSION_COOKIE;
use crate::http::forms::{FieldView, FormData, FormView};
use crate::http::redirect::{found, safe_next, DEFAULT_REDIRECT};
use crate::http::server::AppState;
use crate::models::{validate_email, validate_name, NewPassword, Username, ValidationError};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Serialize)]
pub struct SignupContext {
    pub form: FormView,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct LoginContext {
    pub form: FormView,
    pub next: Option<String>,
    pub csrf_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

fn signup_form(data: &FormData) -> FormView {
    FormView::new(vec![
        FieldView::new("first_name", "First name", "text").value(data.text("first_name")),
        FieldView::new("last_name", "Last name", "text").value(data.text("last_name")),
        FieldView::new("username", "Username", "text")
            .required()
            .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
            .value(data.text("username")),
        FieldView::new("email", "Email address", "email").value(data.text("email")),
        FieldView::new("password1", "Password", "password").required(),
        FieldView::new("password2", "Password confirmation", "password")
            .required()
            .help("Enter the same password as before, for verification."),
    ])
}

fn login_form(username: &str) -> FormView {
    FormView::new(vec![
        FieldView::new("username", "Username", "text")
            .required()
            .value(username),
        FieldView::new("password", "Password", "password").required(),
    ])
}

/// Keep a valid value, or record the error on the form.
fn accept<T>(form: &mut FormView, result: Result<T, ValidationError>) -> Option<T> {
    result.map_err(|e| form.add_validation_error(&e)).ok()
}

/// GET /auth/signup/
async fn signup_form_page(csrf: CsrfToken) -> Json<SignupContext> {
    Json(SignupContext {
        form: signup_form(&FormData::default()),
        csrf_token: csrf.0,
    })
}

/// POST /auth/signup/
async fn signup(
    State(state): State<Arc<AppState>>,
    csrf: CsrfToken,
    data: FormData,
) -> Result<Response, ApiError> {
    let mut form = signup_form(&data).bound();

    let first_name = accept(&mut form, validate_name("first_name", data.text("first_name")));
    let last_name = accept(&mut form, validate_name("last_name", data.text("last_name")));
    let email = accept(&mut form, validate_email(data.text("email")));
    let username = accept(&mut form, Username::new(data.text("username")));
    let password = accept(
        &mut form,
        NewPassword::new(data.text("password1"), data.text("password2")),
    );

    let (Some(first_name), Some(last_name), Some(email), Some(username), Some(password)) =
        (first_name, last_name, email, username, password)
    else {
        return Ok(Json(SignupContext {
            form,
            csrf_token: csrf.0,
        })
        .into_response());
    };

    let new_user = NewUser {
        username,
        email,
        first_name,
        last_name,
        password_hash: hash_password(&password).await?,
    };

    match UserRepo::new(&state.pool).create(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "account created");
            Ok(found(DEFAULT_REDIRECT))
        }
        Err(DbError::Conflict { .. }) => {
            form.add_error("username", USERNAME_TAKEN);
            Ok(Json(SignupContext {
                form,
                csrf_token: csrf.0,
            })
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login/
async fn login_form_page(
    csrf: CsrfToken,
    Query(params): Query<NextParam>,
) -> Json<LoginContext> {
    Json(LoginContext {
        form: login_form(""),
        next: params.next,
        csrf_token: csrf.0,
    })
}

/// POST /auth/login/
async fn login(
    State(state): State<Arc<AppState>>,
    csrf: CsrfToken,
    jar: CookieJar,
    data: FormData,
) -> Result<Response, ApiError> {
    let username = data.text("username").trim();
    let next = Some(data.text("next")).filter(|n| !n.is_empty());

    let Some(user) = authenticate(&state.pool, username, data.text("password")).await? else {
        let mut form = login_form(username).bound();
        form.add_error("__all__", BAD_CREDENTIALS);
        return Ok(Json(LoginContext {
            form,
            next: next.map(str::to_owned),
            csrf_token: csrf.0,
        })
        .into_response());
    };

    let sessions = SessionRepo::new(&state.pool);
    if let Some(old) = jar.get(SESSION_COOKIE) {
        sessions.delete(old.value()).await?;
    }
    let key = sessions.create(user.id).await?;
    tracing::info!(user_id = user.id, "logged in");

    let cookie = Cookie::build((SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), found(safe_next(next))).into_response())
}

/// GET|POST /auth/logout/
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        SessionRepo::new(&state.pool).delete(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "logged_out": true }))).into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup/", get(signup_form_page).post(signup))
        .route("/auth/login/", get(login_form_page).post(login))
        .route("/auth/logout/", get(logout).post(logout))
}
