//! Comment submission
//!
//! Endpoints:
//! - POST /posts/{id}/comment/ - append a comment, back to the post

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::Router;

use crate::db::{CommentRepo, PostRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidPostId};
use crate::http::forms::{FieldView, FormData, FormView};
use crate::http::redirect::{found, post_url};
use crate::http::server::AppState;
use crate::models::CommentText;

/// Comment form shown under a post.
pub fn comment_form(text: &str) -> FormView {
    FormView::new(vec![FieldView::new("text", "Comment text", "textarea")
        .required()
        .help("Enter the comment text")
        .value(text)])
}

/// POST /posts/{id}/comment/
///
/// Blank comments are dropped; the redirect happens either way.
async fn add_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidPostId(post_id): ValidPostId,
    data: FormData,
) -> Result<Response, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;

    match CommentText::new(data.text("text")) {
        Ok(text) => {
            let comment = CommentRepo::new(&state.pool)
                .create(post.id, user.id, text)
                .await?;
            tracing::info!(post_id = post.id, comment_id = comment.id, "comment added");
        }
        Err(e) => tracing::debug!(post_id = post.id, error = %e, "ignoring blank comment"),
    }

    Ok(found(&post_url(post.id)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/posts/{post_id}/comment/", post(add_comment))
}
