//! Post lists, post detail, and the create/edit form
//!
//! Endpoints:
//! - GET /                   - site-wide list (cached, see `cache`)
//! - GET /group/{slug}/      - posts in a group
//! - GET /posts/{id}/        - one post with its comments
//! - GET|POST /create/       - new post form
//! - GET|POST /posts/{id}/edit/ - edit form, author only

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use super::comments::comment_form;
use crate::db::{
    Comment, CommentRepo, Group, GroupRepo, NewPost, Post, PostFilter, PostRepo,
};
use crate::http::csrf::CsrfToken;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidPostId};
use crate::http::forms::{Choice, FieldView, FormData, FormView};
use crate::http::redirect::{found, post_url, profile_url};
use crate::http::server::AppState;
use crate::media::{ImageKind, MediaError};
use crate::models::{PageParams, Paginated, PostText};

const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

#[derive(Serialize)]
pub struct IndexContext {
    pub page_obj: Paginated<Post>,
}

#[derive(Serialize)]
pub struct GroupContext {
    pub group: Group,
    pub page_obj: Paginated<Post>,
}

#[derive(Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    /// Number of posts by the same author
    pub posts_count: i64,
    pub comments: Vec<Comment>,
    pub form: FormView,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct PostFormContext {
    pub form: FormView,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub csrf_token: String,
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<IndexContext>, ApiError> {
    let page_obj = PostRepo::new(&state.pool)
        .list(PostFilter::All, params.requested(), state.config.posts_per_page)
        .await?;

    Ok(Json(IndexContext { page_obj }))
}

/// GET /group/{slug}/
async fn group_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<GroupContext>, ApiError> {
    let group = GroupRepo::new(&state.pool).get_by_slug(&slug).await?;
    let page_obj = PostRepo::new(&state.pool)
        .list(
            PostFilter::Group(group.id),
            params.requested(),
            state.config.posts_per_page,
        )
        .await?;

    Ok(Json(GroupContext { group, page_obj }))
}

/// GET /posts/{id}/
async fn post_detail(
    State(state): State<Arc<AppState>>,
    ValidPostId(post_id): ValidPostId,
    csrf: CsrfToken,
) -> Result<Json<PostDetailContext>, ApiError> {
    let posts = PostRepo::new(&state.pool);
    let post = posts.get(post_id).await?;
    let posts_count = posts.count(PostFilter::Author(post.author_id)).await?;
    let comments = CommentRepo::new(&state.pool).list_for_post(post_id).await?;

    Ok(Json(PostDetailContext {
        post,
        posts_count,
        comments,
        form: comment_form(""),
        csrf_token: csrf.0,
    }))
}

/// Post form with group choices, pre-filled with the given values.
async fn post_form(
    state: &AppState,
    text: &str,
    group: Value,
    image: Option<&str>,
) -> Result<FormView, ApiError> {
    let choices = GroupRepo::new(&state.pool)
        .list()
        .await?
        .into_iter()
        .map(|g| Choice {
            value: g.id,
            label: g.title,
        })
        .collect();

    Ok(FormView::new(vec![
        FieldView::new("text", "Post text", "textarea")
            .required()
            .help("Text of the new post")
            .value(text),
        FieldView::new("group", "Group", "select")
            .help("Choose a group")
            .value(group)
            .choices(choices),
        FieldView::new("image", "Image", "file").value(image),
    ]))
}

/// Validate a submitted post form.
///
/// On success the uploaded image, if any, has been stored. On failure the
/// bound form is returned for re-rendering and nothing is written.
async fn validate_post_form(
    state: &AppState,
    data: &FormData,
    current_image: Option<&str>,
) -> Result<Result<NewPost, FormView>, ApiError> {
    let raw_group = data.text("group").trim();
    let group_value = if raw_group.is_empty() {
        Value::Null
    } else {
        Value::from(raw_group)
    };

    let mut form = post_form(state, data.text("text"), group_value, current_image)
        .await?
        .bound();

    let text = PostText::new(data.text("text"))
        .map_err(|e| form.add_validation_error(&e))
        .ok();

    let mut group_id = None;
    if !raw_group.is_empty() {
        let found = match raw_group.parse::<i64>() {
            Ok(id) => GroupRepo::new(&state.pool).find(id).await?,
            Err(_) => None,
        };
        match found {
            Some(group) => group_id = Some(group.id),
            None => form.add_error("group", INVALID_GROUP),
        }
    }

    let upload = data.file("image");
    if let Some(file) = upload {
        match ImageKind::detect(file.bytes.clone()).await {
            Ok(_) => {}
            Err(MediaError::NotAnImage) => form.add_error("image", INVALID_IMAGE),
            Err(e) => return Err(e.into()),
        }
    }

    let Some(text) = text.filter(|_| form.is_valid()) else {
        return Ok(Err(form));
    };

    let image = match upload {
        Some(file) => Some(
            state
                .media
                .save_post_image(&file.file_name, file.bytes.clone())
                .await?,
        ),
        None => None,
    };

    Ok(Ok(NewPost {
        text,
        group_id,
        image,
    }))
}

/// GET /create/
async fn post_create_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    csrf: CsrfToken,
) -> Result<Json<PostFormContext>, ApiError> {
    let form = post_form(&state, "", Value::Null, None).await?;
    Ok(Json(PostFormContext {
        form,
        is_edit: false,
        post_id: None,
        csrf_token: csrf.0,
    }))
}

/// POST /create/
async fn post_create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    csrf: CsrfToken,
    data: FormData,
) -> Result<Response, ApiError> {
    match validate_post_form(&state, &data, None).await? {
        Ok(new_post) => {
            let post = PostRepo::new(&state.pool).create(user.id, new_post).await?;
            tracing::info!(post_id = post.id, author = %user.username, "post created");
            Ok(found(&profile_url(&user.username)))
        }
        Err(form) => Ok(Json(PostFormContext {
            form,
            is_edit: false,
            post_id: None,
            csrf_token: csrf.0,
        })
        .into_response()),
    }
}

/// Load a post the requester is allowed to edit.
async fn editable_post(state: &AppState, post_id: i64, user_id: i64) -> Result<Post, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if post.author_id != user_id {
        return Err(ApiError::forbidden("only the author can edit this post"));
    }
    Ok(post)
}

/// GET /posts/{id}/edit/
async fn post_edit_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidPostId(post_id): ValidPostId,
    csrf: CsrfToken,
) -> Result<Json<PostFormContext>, ApiError> {
    let post = editable_post(&state, post_id, user.id).await?;
    let form = post_form(
        &state,
        &post.text,
        Value::from(post.group_id),
        post.image.as_deref(),
    )
    .await?;

    Ok(Json(PostFormContext {
        form,
        is_edit: true,
        post_id: Some(post.id),
        csrf_token: csrf.0,
    }))
}

/// POST /posts/{id}/edit/
async fn post_edit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidPostId(post_id): ValidPostId,
    csrf: CsrfToken,
    data: FormData,
) -> Result<Response, ApiError> {
    let post = editable_post(&state, post_id, user.id).await?;

    match validate_post_form(&state, &data, post.image.as_deref()).await? {
        Ok(changes) => {
            PostRepo::new(&state.pool).update(post.id, changes).await?;
            tracing::info!(post_id = post.id, "post edited");
            Ok(found(&post_url(post.id)))
        }
        Err(form) => Ok(Json(PostFormContext {
            form,
            is_edit: true,
            post_id: Some(post.id),
            csrf_token: csrf.0,
        })
        .into_response()),
    }
}

/// Post routes, except `/` which the server wraps in the response cache
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/group/{slug}/", get(group_posts))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
}
