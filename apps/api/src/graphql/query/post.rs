//! Post queries

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::loaders::Loaders;
use crate::graphql::types::Post;
use crate::storage::SharedStorage;

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts
    async fn posts(&self, ctx: &Context<'_>) -> Result<Option<Vec<Post>>> {
        let storage = ctx.data::<SharedStorage>()?;
        let posts = storage
            .find_posts()
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;
        Ok(Some(posts.into_iter().map(Post::from).collect()))
    }

    /// Look up a post by id
    async fn post(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Post>> {
        let loaders = ctx.data::<Loaders>()?;
        let post = loaders.post.load(id).await?;
        Ok(post.map(Post::from))
    }
}
