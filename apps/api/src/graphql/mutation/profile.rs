//! Profile mutations

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::types::{MemberTypeId, Profile};
use crate::models::{CreateProfile, UpdateProfile};
use crate::storage::SharedStorage;

/// Input for creating a profile
#[derive(Debug, Clone, InputObject)]
pub struct CreateProfileInput {
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

/// Input for changing a profile; omitted fields keep their value
#[derive(Debug, Clone, InputObject)]
pub struct ChangeProfileInput {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

#[derive(Default)]
pub struct ProfileMutation;

#[Object]
impl ProfileMutation {
    async fn create_profile(
        &self,
        ctx: &Context<'_>,
        dto: CreateProfileInput,
    ) -> Result<Option<Profile>> {
        let storage = ctx.data::<SharedStorage>()?;

        let profile = storage
            .create_profile(CreateProfile {
                is_male: dto.is_male,
                year_of_birth: dto.year_of_birth,
                user_id: dto.user_id,
                member_type_id: dto.member_type_id.into(),
            })
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(Profile::from(profile)))
    }

    async fn change_profile(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeProfileInput,
    ) -> Result<Option<Profile>> {
        let storage = ctx.data::<SharedStorage>()?;

        let profile = storage
            .update_profile(
                id,
                UpdateProfile {
                    is_male: dto.is_male,
                    year_of_birth: dto.year_of_birth,
                    member_type_id: dto.member_type_id.map(Into::into),
                },
            )
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(Profile::from(profile)))
    }

    async fn delete_profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let storage = ctx.data::<SharedStorage>()?;
        storage
            .delete_profile(id)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(true))
    }
}
