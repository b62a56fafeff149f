//! Profile queries

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::loaders::Loaders;
use crate::graphql::types::Profile;
use crate::storage::SharedStorage;

#[derive(Default)]
pub struct ProfileQuery;

#[Object]
impl ProfileQuery {
    /// All profiles
    async fn profiles(&self, ctx: &Context<'_>) -> Result<Option<Vec<Profile>>> {
        let storage = ctx.data::<SharedStorage>()?;
        let profiles = storage
            .find_profiles()
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(profiles.into_iter().map(Profile::from).collect()))
    }

    /// Look up a profile by id
    async fn profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Profile>> {
        let loaders = ctx.data::<Loaders>()?;
        let profile = loaders.profile.load(id).await?;
        Ok(profile.map(Profile::from))
    }
}
