//! Post mutations

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::types::Post;
use crate::models::{CreatePost, UpdatePost};
use crate::storage::SharedStorage;

use super::validate_name;

/// Input for creating a post
#[derive(Debug, Clone, InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

/// Input for changing a post; omitted fields keep their value
#[derive(Debug, Clone, InputObject)]
pub struct ChangePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, dto: CreatePostInput) -> Result<Option<Post>> {
        validate_name("title", &dto.title).map_err(ApiError::into_graphql_error)?;
        let storage = ctx.data::<SharedStorage>()?;

        let post = storage
            .create_post(CreatePost {
                title: dto.title,
                content: dto.content,
                author_id: dto.author_id,
            })
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(Post::from(post)))
    }

    async fn change_post(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangePostInput,
    ) -> Result<Option<Post>> {
        if let Some(title) = &dto.title {
            validate_name("title", title).map_err(ApiError::into_graphql_error)?;
        }
        let storage = ctx.data::<SharedStorage>()?;

        let post = storage
            .update_post(
                id,
                UpdatePost {
                    title: dto.title,
                    content: dto.content,
                },
            )
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(Post::from(post)))
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<bool>> {
        let storage = ctx.data::<SharedStorage>()?;
        storage
            .delete_post(id)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(true))
    }
}
