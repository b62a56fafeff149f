//! Shared utility functions for repositories

/// SQL columns for user queries
pub const USER_COLUMNS: &str = "id, name, balance";

/// SQL columns for post queries
pub const POST_COLUMNS: &str = "id, title, content, author_id";

/// SQL columns for profile queries
pub const PROFILE_COLUMNS: &str = "id, is_male, year_of_birth, user_id, member_type_id";

/// SQL columns for member type queries
pub const MEMBER_TYPE_COLUMNS: &str = "id, discount, posts_limit_per_month";

/// PostgreSQL error code for unique constraint violations
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for foreign key violations
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Returns the SQLSTATE code of a database error, if the error came from the server
pub fn sqlstate(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Whether the error is a constraint violation caused by the request payload
pub fn is_constraint_violation(error: &sqlx::Error) -> bool {
    matches!(
        sqlstate(error).as_deref(),
        Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION)
    )
}
