//! Subscription repository for the subscribers_on_authors join table

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Subscription;

/// Repository for subscription edges
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new SubscriptionRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Edges where the subscriber is any of `subscriber_ids`
    pub async fn find_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"SELECT subscriber_id, author_id FROM subscribers_on_authors
            WHERE subscriber_id = ANY($1)
            ORDER BY subscriber_id, author_id"#,
        )
        .bind(subscriber_ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Edges where the author is any of `author_ids`
    pub async fn find_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"SELECT subscriber_id, author_id FROM subscribers_on_authors
            WHERE author_id = ANY($1)
            ORDER BY author_id, subscriber_id"#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Insert an edge
    pub async fn create(&self, edge: Subscription) -> Result<Subscription, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"INSERT INTO subscribers_on_authors (subscriber_id, author_id)
            VALUES ($1, $2)
            RETURNING subscriber_id, author_id"#,
        )
        .bind(edge.subscriber_id)
        .bind(edge.author_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Delete an edge, returning it if it existed
    pub async fn delete(&self, edge: Subscription) -> Result<Option<Subscription>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"DELETE FROM subscribers_on_authors
            WHERE subscriber_id = $1 AND author_id = $2
            RETURNING subscriber_id, author_id"#,
        )
        .bind(edge.subscriber_id)
        .bind(edge.author_id)
        .fetch_optional(&self.pool)
        .await
    }
}
