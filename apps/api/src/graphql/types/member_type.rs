//! Membership tier GraphQL types

use async_graphql::{Context, Enum, Object, Result};

use crate::graphql::loaders::Loaders;
use crate::models::{MemberType as DbMemberType, MemberTypeId as DbMemberTypeId};

use super::profile::Profile;

/// Membership tier identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl From<DbMemberTypeId> for MemberTypeId {
    fn from(id: DbMemberTypeId) -> Self {
        match id {
            DbMemberTypeId::Basic => Self::Basic,
            DbMemberTypeId::Business => Self::Business,
        }
    }
}

impl From<MemberTypeId> for DbMemberTypeId {
    fn from(id: MemberTypeId) -> Self {
        match id {
            MemberTypeId::Basic => Self::Basic,
            MemberTypeId::Business => Self::Business,
        }
    }
}

/// Membership tier exposed via GraphQL
pub struct MemberType {
    inner: DbMemberType,
}

impl MemberType {
    pub fn new(member_type: DbMemberType) -> Self {
        Self { inner: member_type }
    }
}

impl From<DbMemberType> for MemberType {
    fn from(member_type: DbMemberType) -> Self {
        Self::new(member_type)
    }
}

#[Object]
impl MemberType {
    async fn id(&self) -> MemberTypeId {
        self.inner.id.into()
    }

    /// Discount in percent
    async fn discount(&self) -> f64 {
        self.inner.discount
    }

    /// Monthly post quota
    async fn posts_limit_per_month(&self) -> i32 {
        self.inner.posts_limit_per_month
    }

    /// Profiles on this tier
    async fn profiles(&self, ctx: &Context<'_>) -> Result<Option<Vec<Profile>>> {
        let loaders = ctx.data::<Loaders>()?;
        let profiles = loaders.profiles_by_member_type.load(self.inner.id).await?;
        Ok(Some(
            profiles
                .unwrap_or_default()
                .into_iter()
                .map(Profile::from)
                .collect(),
        ))
    }
}
