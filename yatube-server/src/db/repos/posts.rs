//! Post repository
//!
//! Every list query is reverse-chronological (`pub_date DESC, id DESC`)
//! and joins author and group so a page is a single round trip.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::DbError;
use crate::models::{preview, Paginated, Pagination, PostText};

/// Post record joined with its author and group
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    /// Media-relative path, e.g. `posts/1f0c…_cat.gif`
    pub image: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(preview(&self.text))
    }
}

/// Which posts a list query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Site-wide
    All,
    /// Posts in one group
    Group(i64),
    /// Posts by one author
    Author(i64),
    /// Posts by every author the given user follows
    Feed(i64),
}

/// Fields submitted by the post form
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: PostText,
    pub group_id: Option<i64>,
    /// `None` on edit keeps the stored image
    pub image: Option<String>,
}

const POST_SELECT: &str = r#"
    SELECT
        p.id,
        p.text,
        p.pub_date,
        p.image,
        p.author_id,
        u.username AS author_username,
        p.group_id,
        g.slug AS group_slug,
        g.title AS group_title
    FROM posts_post p
    JOIN auth_user u ON u.id = p.author_id
    LEFT JOIN posts_group g ON g.id = p.group_id
"#;

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            builder.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            builder.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        PostFilter::Feed(user_id) => {
            builder
                .push(" WHERE p.author_id IN (SELECT author_id FROM posts_follow WHERE user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post stamped with the current time.
    pub async fn create(&self, author_id: i64, post: NewPost) -> Result<Post, DbError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts_post (text, pub_date, author_id, group_id, image)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post.text.as_str())
        .bind(Utc::now())
        .bind(author_id)
        .bind(post.group_id)
        .bind(post.image.as_deref())
        .fetch_one(self.pool)
        .await?;

        self.get(id).await
    }

    /// Replace text and group; the image changes only when a new one is given.
    pub async fn update(&self, id: i64, post: NewPost) -> Result<Post, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE posts_post SET
                text = ?,
                group_id = ?,
                image = COALESCE(?, image)
            WHERE id = ?
            "#,
        )
        .bind(post.text.as_str())
        .bind(post.group_id)
        .bind(post.image.as_deref())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Post, DbError> {
        let mut builder = QueryBuilder::new(POST_SELECT);
        builder.push(" WHERE p.id = ").push_bind(id);

        builder
            .build_query_as::<Post>()
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))
    }

    pub async fn count(&self, filter: PostFilter) -> Result<i64, DbError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM posts_post p");
        push_filter(&mut builder, filter);

        let total = builder.build_query_scalar::<i64>().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// One page of posts, newest first.
    ///
    /// `requested` is the raw `?page=` value; see [`Pagination::resolve`].
    pub async fn list(
        &self,
        filter: PostFilter,
        requested: Option<&str>,
        per_page: u32,
    ) -> Result<Paginated<Post>, DbError> {
        let total = self.count(filter).await?;
        let page = Pagination::resolve(requested, per_page, total);

        let mut builder = QueryBuilder::new(POST_SELECT);
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = builder.build_query_as::<Post>().fetch_all(self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Delete a post and, through cascades, its comments.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts_post WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        Ok(())
    }
}
