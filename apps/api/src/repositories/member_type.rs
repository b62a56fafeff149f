//! Member type repository for centralized database operations

use sqlx::PgPool;

use super::utils::MEMBER_TYPE_COLUMNS;
use crate::models::{MemberType, MemberTypeId};

/// Repository for membership tier database operations
#[derive(Clone)]
pub struct MemberTypeRepository {
    pool: PgPool,
}

impl MemberTypeRepository {
    /// Create a new MemberTypeRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every membership tier
    pub async fn find_all(&self) -> Result<Vec<MemberType>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM member_types ORDER BY id ASC",
            MEMBER_TYPE_COLUMNS
        );
        sqlx::query_as::<_, MemberType>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    /// Find all tiers whose id is in `ids`
    pub async fn find_by_ids(&self, ids: &[MemberTypeId]) -> Result<Vec<MemberType>, sqlx::Error> {
        let ids: Vec<&str> = ids.iter().map(MemberTypeId::as_str).collect();
        let sql = format!(
            "SELECT {} FROM member_types WHERE id = ANY($1)",
            MEMBER_TYPE_COLUMNS
        );
        sqlx::query_as::<_, MemberType>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }
}
