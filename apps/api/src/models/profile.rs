//! Profile model for Murmur
//!
//! Every user has at most one profile, which links them to a membership tier.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::MemberTypeId;

/// Profile record from the profiles table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Profile {
    /// Unique profile identifier
    pub id: Uuid,

    /// Whether the user identifies as male
    pub is_male: bool,

    /// Year of birth
    pub year_of_birth: i32,

    /// Owning user (unique)
    pub user_id: Uuid,

    /// Membership tier
    pub member_type_id: MemberTypeId,
}

/// Profile creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}
