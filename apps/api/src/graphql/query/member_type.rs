//! Membership tier queries

use async_graphql::{Context, Object, Result};

use crate::error::ApiError;
use crate::graphql::loaders::Loaders;
use crate::graphql::types::{MemberType, MemberTypeId};
use crate::storage::SharedStorage;

#[derive(Default)]
pub struct MemberTypeQuery;

#[Object]
impl MemberTypeQuery {
    /// All membership tiers
    async fn member_types(&self, ctx: &Context<'_>) -> Result<Option<Vec<MemberType>>> {
        let storage = ctx.data::<SharedStorage>()?;
        let member_types = storage
            .find_member_types()
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(member_types.into_iter().map(MemberType::from).collect()))
    }

    /// Look up a membership tier by id
    async fn member_type(&self, ctx: &Context<'_>, id: MemberTypeId) -> Result<Option<MemberType>> {
        let loaders = ctx.data::<Loaders>()?;
        let member_type = loaders.member_type.load(id.into()).await?;
        Ok(member_type.map(MemberType::from))
    }
}
