//! User queries

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::loaders::Loaders;
use crate::graphql::planner::plan_users;
use crate::graphql::selection::SelectionNode;
use crate::graphql::types::User;
use crate::storage::SharedStorage;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// All users
    ///
    /// Subscription relations selected on the rows are fetched in the same
    /// storage round trip, and every row is primed into the user loader so
    /// nested lookups of these users are served from the cache.
    async fn users(&self, ctx: &Context<'_>) -> Result<Option<Vec<User>>> {
        let storage = ctx.data::<SharedStorage>()?;
        let loaders = ctx.data::<Loaders>()?;

        let include = plan_users(&SelectionNode::from_field(ctx.field()));
        let users = storage
            .find_users(include)
            .await
            .map_err(|e| ApiError::from(e).into_graphql_error())?;

        for user in &users {
            loaders.user.prime(user.id, user.clone());
        }
        Ok(Some(users.into_iter().map(User::from).collect()))
    }

    /// Look up a user by id
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let loaders = ctx.data::<Loaders>()?;
        let user = loaders.user.load(id).await?;
        Ok(user.map(User::from))
    }
}
