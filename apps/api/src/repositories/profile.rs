//! Profile repository for centralized database operations

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::PROFILE_COLUMNS;
use crate::models::{CreateProfile, MemberTypeId, Profile, UpdateProfile};

/// Repository for profile database operations
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new ProfileRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every profile
    pub async fn find_all(&self) -> Result<Vec<Profile>, sqlx::Error> {
        let sql = format!("SELECT {} FROM profiles ORDER BY id ASC", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql).fetch_all(&self.pool).await
    }

    /// Find all profiles whose id is in `ids`
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, sqlx::Error> {
        let sql = format!("SELECT {} FROM profiles WHERE id = ANY($1)", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Find the profiles owned by any of `user_ids`
    pub async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Find all profiles on any of the given membership tiers
    pub async fn find_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let ids: Vec<&str> = member_type_ids.iter().map(MemberTypeId::as_str).collect();
        let sql = format!(
            "SELECT {} FROM profiles WHERE member_type_id = ANY($1) ORDER BY member_type_id, id",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert a new profile
    pub async fn create(&self, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let sql = format!(
            r#"INSERT INTO profiles (id, is_male, year_of_birth, user_id, member_type_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.is_male)
            .bind(input.year_of_birth)
            .bind(input.user_id)
            .bind(input.member_type_id.as_str())
            .fetch_one(&self.pool)
            .await
    }

    /// Update the provided columns, returning `None` if the profile does not exist
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let sql = format!(
            r#"UPDATE profiles SET
                is_male = COALESCE($2, is_male),
                year_of_birth = COALESCE($3, year_of_birth),
                member_type_id = COALESCE($4, member_type_id)
            WHERE id = $1
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(input.is_male)
            .bind(input.year_of_birth)
            .bind(input.member_type_id.as_ref().map(MemberTypeId::as_str))
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a profile, returning the deleted row
    pub async fn delete(&self, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        let sql = format!(
            "DELETE FROM profiles WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
