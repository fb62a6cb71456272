//! Signup, login, logout and CSRF checks

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{json, location, urlencoded, TestApp};
use yatube_server::db::UserRepo;

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

/// `name=value` pair from a Set-Cookie header.
fn cookie_pair(response: &axum::response::Response, name: &str) -> String {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next().map(str::to_owned))
        .expect("cookie set")
}

#[tokio::test]
async fn signup_then_login() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/auth/signup/",
            None,
            &[
                ("first_name", "Leo"),
                ("last_name", "Tolstoy"),
                ("username", "leo"),
                ("email", "leo@example.com"),
                ("password1", "war-and-peace"),
                ("password2", "war-and-peace"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let user = UserRepo::new(&app.state.pool).get_by_username("leo").await.unwrap();
    assert_eq!((user.first_name.as_str(), user.last_name.as_str()), ("Leo", "Tolstoy"));

    let response = app
        .post_form(
            "/auth/login/",
            None,
            &[
                ("username", "leo"),
                ("password", "war-and-peace"),
                ("next", "/create/"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/create/");

    let session = cookie_pair(&response, "sessionid");
    let form = app.get("/create/", Some(&session)).await;
    assert_eq!(form.status(), StatusCode::OK);

    let logout = app.get("/auth/logout/", Some(&session)).await;
    assert_eq!(json(logout).await["logged_out"], true);

    let after = app.get("/create/", Some(&session)).await;
    assert_eq!(after.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn signup_errors_are_inline() {
    let app = TestApp::new().await;
    app.user("taken").await;

    let context = json(
        app.post_form(
            "/auth/signup/",
            None,
            &[
                ("username", "bad name!"),
                ("password1", "short"),
                ("password2", "short"),
            ],
        )
        .await,
    )
    .await;
    let fields = context["form"]["fields"].as_array().unwrap();
    let errors_of = |name: &str| {
        fields
            .iter()
            .find(|f| f["name"] == name)
            .map(|f| f["errors"].as_array().unwrap().len())
            .unwrap()
    };
    assert_eq!(errors_of("username"), 1);
    assert_eq!(errors_of("password2"), 1);

    let context = json(
        app.post_form(
            "/auth/signup/",
            None,
            &[
                ("username", "taken"),
                ("password1", "long enough"),
                ("password2", "long enough"),
            ],
        )
        .await,
    )
    .await;
    assert_eq!(
        context["form"]["fields"][2]["errors"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn wrong_password_rerenders_login() {
    let app = TestApp::new().await;
    app.user("leo").await;

    let context = json(
        app.post_form(
            "/auth/login/",
            None,
            &[("username", "leo"), ("password", "guess")],
        )
        .await,
    )
    .await;
    assert_eq!(
        context["form"]["non_field_errors"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn unsafe_next_goes_home() {
    let app = TestApp::new().await;
    app.post_form(
        "/auth/signup/",
        None,
        &[
            ("username", "leo"),
            ("password1", "war-and-peace"),
            ("password2", "war-and-peace"),
        ],
    )
    .await;

    let response = app
        .post_form(
            "/auth/login/",
            None,
            &[
                ("username", "leo"),
                ("password", "war-and-peace"),
                ("next", "https://evil.example/"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn login_page_carries_next() {
    let app = TestApp::new().await;
    let context = json(app.get("/auth/login/?next=/create/", None).await).await;
    assert_eq!(context["next"], "/create/");
}

#[tokio::test]
async fn csrf_cookie_is_issued() {
    let app = TestApp::with_config(|_| {}).await;
    let response = app.get("/auth/login/", None).await;
    let pair = cookie_pair(&response, "csrftoken");

    let token = pair.trim_start_matches("csrftoken=");
    assert_eq!(json(response).await["csrf_token"], token);
}

#[tokio::test]
async fn post_without_csrf_token_is_403() {
    let app = TestApp::with_config(|_| {}).await;
    let user = app.user("auth").await;
    let session = app.login(&user).await;

    let response = app
        .post_form("/create/", Some(&session), &[("text", "No token")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let cookies = format!("{session}; csrftoken=0123456789abcdef0123456789abcdef");
    let response = app
        .post_form(
            "/create/",
            Some(&cookies),
            &[("text", "Wrong token"), ("csrfmiddlewaretoken", "ffffffffffffffffffffffffffffffff")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.post_count().await, 0);
}

#[tokio::test]
async fn matching_csrf_token_passes() {
    let app = TestApp::with_config(|_| {}).await;
    let user = app.user("auth").await;
    let session = app.login(&user).await;
    let token = "0123456789abcdef0123456789abcdef";
    let cookies = format!("{session}; csrftoken={token}");

    let response = app
        .post_form(
            "/create/",
            Some(&cookies),
            &[("text", "Form token"), ("csrfmiddlewaretoken", token)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let request = Request::post("/create/")
        .header(header::COOKIE, &cookies)
        .header("X-CSRFToken", token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(urlencoded(&[("text", "Header token")])))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    assert_eq!(app.post_count().await, 2);
}
