//! Membership tier model for Murmur

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Membership tier identifier, stored as text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl MemberTypeId {
    /// Column value for this tier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Business => "BUSINESS",
        }
    }
}

impl std::fmt::Display for MemberTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership tier record from the member_types table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MemberType {
    /// Tier identifier
    pub id: MemberTypeId,

    /// Discount in percent
    pub discount: f64,

    /// Monthly post quota
    pub posts_limit_per_month: i32,
}

impl MemberType {
    /// The tiers every fresh database starts with
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: MemberTypeId::Basic,
                discount: 2.3,
                posts_limit_per_month: 20,
            },
            Self {
                id: MemberTypeId::Business,
                discount: 7.7,
                posts_limit_per_month: 100,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_id_serialization() {
        let json = serde_json::to_string(&MemberTypeId::Business).unwrap();
        assert_eq!(json, "\"BUSINESS\"");
        assert_eq!(MemberTypeId::Basic.to_string(), "BASIC");
    }

    #[test]
    fn test_default_tiers() {
        let tiers = MemberType::defaults();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].id, MemberTypeId::Basic);
        assert_eq!(tiers[1].posts_limit_per_month, 100);
    }
}
