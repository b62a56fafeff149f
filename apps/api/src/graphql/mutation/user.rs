//! User mutations
//!
//! - createUser / changeUser / deleteUser
//! - subscribeTo / unsubscribeFrom: manage subscription edges

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::types::User;
use crate::models::{CreateUser, UpdateUser};
use crate::storage::SharedStorage;

use super::validate_name;

/// Input for creating a user
#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub balance: f64,
}

/// Input for changing a user; omitted fields keep their value
#[derive(Debug, Clone, InputObject)]
pub struct ChangeUserInput {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(&self, ctx: &Context<'_>, dto: CreateUserInput) -> Result<Option<User>> {
        validate_name("name", &dto.name).map_err(ApiError::into_graphql_error)?;
        let storage = ctx.data::<SharedStorage>()?;

        let user = storage
            .create_user(CreateUser {
                name: dto.name,
                balance: dto.balance,
            })
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(Some(User::from(user)))
    }

    async fn change_user(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeUserInput,
    ) -> Result<Option<User>> {
        if let Some(name) = &dto.name {
            validate_name("name", name).map_err(ApiError::into_graphql_error)?;
        }
        let storage = ctx.data::<SharedStorage>()?;

        let user = storage
            .update_user(
                id,
                UpdateUser {
                    name: dto.name,
                    balance: dto.balance,
                },
            )
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(User::from(user)))
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let storage = ctx.data::<SharedStorage>()?;
        storage
            .delete_user(id)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;

        tracing::info!(user_id = %id, "Deleted user");
        Ok(Some(true))
    }

    /// Subscribe `user_id` to `author_id`, returning the subscriber
    async fn subscribe_to(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<User>> {
        let storage = ctx.data::<SharedStorage>()?;
        let user = storage
            .subscribe(user_id, author_id)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(User::from(user)))
    }

    async fn unsubscribe_from(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<bool>> {
        let storage = ctx.data::<SharedStorage>()?;
        storage
            .unsubscribe(user_id, author_id)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(true))
    }
}
