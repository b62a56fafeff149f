//! Post repository for centralized database operations

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::POST_COLUMNS;
use crate::models::{CreatePost, Post, UpdatePost};

/// Repository for post database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new PostRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every post
    pub async fn find_all(&self) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!("SELECT {} FROM posts ORDER BY title ASC, id ASC", POST_COLUMNS);
        sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await
    }

    /// Find all posts whose id is in `ids`
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!("SELECT {} FROM posts WHERE id = ANY($1)", POST_COLUMNS);
        sqlx::query_as::<_, Post>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Find all posts written by any of `author_ids`
    pub async fn find_by_author_ids(&self, author_ids: &[Uuid]) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM posts WHERE author_id = ANY($1) ORDER BY author_id, title ASC",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert a new post
    pub async fn create(&self, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let sql = format!(
            "INSERT INTO posts (id, title, content, author_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Update the provided columns, returning `None` if the post does not exist
    pub async fn update(&self, id: Uuid, input: &UpdatePost) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!(
            r#"UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {}"#,
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.content.as_deref())
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a post, returning the deleted row
    pub async fn delete(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!("DELETE FROM posts WHERE id = $1 RETURNING {}", POST_COLUMNS);
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
