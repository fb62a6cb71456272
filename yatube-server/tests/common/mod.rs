//! Shared helpers for router-level tests
//!
//! Every `TestApp` owns a private in-memory database and media directory,
//! so tests never see each other's rows or cached pages.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use yatube_server::db::{
    create_memory_pool, Group, GroupRepo, NewPost, NewUser, Post, PostRepo, SessionRepo, User,
    UserRepo,
};
use yatube_server::models::{GroupSlug, GroupTitle, PostText, Username};
use yatube_server::{build_router, AppState, ServerConfig};

pub const BOUNDARY: &str = "yatube-test-boundary";

/// 1x1 GIF
pub const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0c\n\x00;";

pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
    media: TempDir,
}

impl TestApp {
    /// App with CSRF checks off, like a test client.
    pub async fn new() -> Self {
        Self::with_config(|config| config.enforce_csrf = false).await
    }

    pub async fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let media = tempfile::tempdir().expect("media dir");
        let mut config = ServerConfig {
            media_root: media.path().to_path_buf(),
            ..Default::default()
        };
        configure(&mut config);

        let pool = create_memory_pool().await.expect("memory pool");
        let state = Arc::new(AppState::new(pool, config));
        let router = build_router(state.clone());

        Self {
            state,
            router,
            media,
        }
    }

    pub fn media_path(&self) -> &std::path::Path {
        self.media.path()
    }

    pub async fn user(&self, name: &str) -> User {
        UserRepo::new(&self.state.pool)
            .create(NewUser::without_password(Username::new(name).unwrap()))
            .await
            .unwrap()
    }

    /// Session cookie for `user`, as sent by a logged-in browser.
    pub async fn login(&self, user: &User) -> String {
        let key = SessionRepo::new(&self.state.pool)
            .create(user.id)
            .await
            .unwrap();
        format!("sessionid={key}")
    }

    pub async fn group(&self, slug: &str) -> Group {
        GroupRepo::new(&self.state.pool)
            .create(
                GroupSlug::new(slug).unwrap(),
                GroupTitle::new(&format!("Group {slug}")).unwrap(),
                "Test description",
            )
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        PostRepo::new(&self.state.pool)
            .create(
                author.id,
                NewPost {
                    text: PostText::new(text).unwrap(),
                    group_id: group.map(|g| g.id),
                    image: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn post_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts_post")
            .fetch_one(&self.state.pool)
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Response {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(urlencoded(fields))).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response {
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart(fields, file))).unwrap())
            .await
    }
}

pub fn urlencoded(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `multipart/form-data` body; `file` is (field, file name, bytes).
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn json(response: Response) -> Value {
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "expected a 200 context document"
    );
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect")
        .to_str()
        .unwrap()
}

/// Texts of the posts in a list context, in page order.
pub fn texts(context: &Value) -> Vec<String> {
    context["page_obj"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_owned())
        .collect()
}
