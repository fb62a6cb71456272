//! Author profiles, subscriptions and the subscription feed
//!
//! Endpoints:
//! - GET /profile/{username}/          - posts by one author
//! - GET|POST /profile/{username}/follow/   - subscribe
//! - GET|POST /profile/{username}/unfollow/ - unsubscribe
//! - GET /follow/                      - posts by followed authors

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::{FollowRepo, Post, PostFilter, PostRepo, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, Viewer};
use crate::http::redirect::{found, profile_url};
use crate::http::server::AppState;
use crate::models::{PageParams, Paginated};

#[derive(Serialize)]
pub struct ProfileContext {
    pub author: User,
    pub posts_count: i64,
    /// Whether the viewer follows `author`
    pub following: bool,
    pub page_obj: Paginated<Post>,
}

#[derive(Serialize)]
pub struct FeedContext {
    pub page_obj: Paginated<Post>,
}

/// GET /profile/{username}/
async fn profile(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProfileContext>, ApiError> {
    let author = UserRepo::new(&state.pool).get_by_username(&username).await?;
    let page_obj = PostRepo::new(&state.pool)
        .list(
            PostFilter::Author(author.id),
            params.requested(),
            state.config.posts_per_page,
        )
        .await?;

    let following = match viewer.id() {
        Some(viewer_id) => {
            FollowRepo::new(&state.pool)
                .is_following(viewer_id, author.id)
                .await?
        }
        None => false,
    };

    Ok(Json(ProfileContext {
        posts_count: page_obj.total,
        author,
        following,
        page_obj,
    }))
}

/// GET|POST /profile/{username}/follow/
async fn profile_follow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let author = UserRepo::new(&state.pool).get_by_username(&username).await?;
    if FollowRepo::new(&state.pool).follow(user.id, author.id).await? {
        tracing::info!(follower = %user.username, author = %author.username, "followed");
    }
    Ok(found(&profile_url(&author.username)))
}

/// GET|POST /profile/{username}/unfollow/
async fn profile_unfollow(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let author = UserRepo::new(&state.pool).get_by_username(&username).await?;
    if FollowRepo::new(&state.pool).unfollow(user.id, author.id).await? {
        tracing::info!(follower = %user.username, author = %author.username, "unfollowed");
    }
    Ok(found(&profile_url(&author.username)))
}

/// GET /follow/
async fn follow_index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<FeedContext>, ApiError> {
    let page_obj = PostRepo::new(&state.pool)
        .list(
            PostFilter::Feed(user.id),
            params.requested(),
            state.config.posts_per_page,
        )
        .await?;

    Ok(Json(FeedContext { page_obj }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile/{username}/", get(profile))
        .route(
            "/profile/{username}/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
        .route("/follow/", get(follow_index))
}
