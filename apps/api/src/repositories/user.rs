//! User repository for centralized database operations

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::USER_COLUMNS;
use crate::models::{CreateUser, UpdateUser, User};

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every user, ordered by name
    pub async fn find_all(&self) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users ORDER BY name ASC, id ASC", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await
    }

    /// Find all users whose id is in `ids`
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert a new user
    pub async fn create(&self, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (id, name, balance) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(input.balance)
            .fetch_one(&self.pool)
            .await
    }

    /// Update the provided columns, returning `None` if the user does not exist
    pub async fn update(&self, id: Uuid, input: &UpdateUser) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            r#"UPDATE users SET
                name = COALESCE($2, name),
                balance = COALESCE($3, balance)
            WHERE id = $1
            RETURNING {}"#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.balance)
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a user, returning the deleted row
    pub async fn delete(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Connectivity check used by the readiness check
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }
}
