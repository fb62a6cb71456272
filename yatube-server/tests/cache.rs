//! Site-wide list caching

mod common;

use common::{body_bytes, TestApp};
use yatube_server::db::PostRepo;

#[tokio::test]
async fn index_is_stable_until_cache_cleared() {
    let app = TestApp::new().await;
    let author = app.user("auth").await;
    let post = app.post(&author, "Cached post", None).await;

    let before = body_bytes(app.get("/", None).await).await;

    PostRepo::new(&app.state.pool).delete(post.id).await.unwrap();
    let after_delete = body_bytes(app.get("/", None).await).await;
    assert_eq!(before, after_delete);

    app.state.index_cache.clear();
    let after_clear = body_bytes(app.get("/", None).await).await;
    assert_ne!(before, after_clear);
}

#[tokio::test]
async fn pages_are_cached_separately() {
    let app = TestApp::new().await;
    let author = app.user("auth").await;
    for i in 0..11 {
        app.post(&author, &format!("post {i}"), None).await;
    }

    let first = body_bytes(app.get("/", None).await).await;
    let second = body_bytes(app.get("/?page=2", None).await).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn other_lists_are_not_cached() {
    let app = TestApp::new().await;
    let author = app.user("auth").await;
    let post = app.post(&author, "Profile post", None).await;

    let before = body_bytes(app.get("/profile/auth/", None).await).await;
    PostRepo::new(&app.state.pool).delete(post.id).await.unwrap();
    let after = body_bytes(app.get("/profile/auth/", None).await).await;
    assert_ne!(before, after);
}

#[tokio::test]
async fn zero_ttl_disables_caching() {
    let app = TestApp::with_config(|config| {
        config.enforce_csrf = false;
        config.index_cache_ttl = std::time::Duration::ZERO;
    })
    .await;
    let author = app.user("auth").await;
    let post = app.post(&author, "Fresh post", None).await;

    let before = body_bytes(app.get("/", None).await).await;
    PostRepo::new(&app.state.pool).delete(post.id).await.unwrap();
    let after = body_bytes(app.get("/", None).await).await;
    assert_ne!(before, after);
}
