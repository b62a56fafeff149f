//! User GraphQL type

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::graphql::loaders::Loaders;
use crate::models::{Relation, Subscription, User as DbUser};

use super::post::Post;
use super::profile::Profile;

/// Which end of a subscription edge the parent user is on
#[derive(Clone, Copy)]
enum Direction {
    /// Authors the user follows
    SubscribedTo,
    /// Users following the user
    Subscribers,
}

impl Direction {
    fn other_end(self, edge: &Subscription) -> Uuid {
        match self {
            Self::SubscribedTo => edge.author_id,
            Self::Subscribers => edge.subscriber_id,
        }
    }
}

/// User exposed via GraphQL
pub struct User {
    inner: DbUser,
}

impl User {
    pub fn new(user: DbUser) -> Self {
        Self { inner: user }
    }

    /// Users on the other end of this user's subscription edges
    ///
    /// Ids attached to the row are used as is; otherwise the edges are
    /// batched through the matching edge loader first.
    async fn related_users(&self, ctx: &Context<'_>, direction: Direction) -> Result<Vec<User>> {
        let loaders = ctx.data::<Loaders>()?;
        let relation = match direction {
            Direction::SubscribedTo => &self.inner.subscribed_to,
            Direction::Subscribers => &self.inner.subscribers,
        };

        let ids = match relation {
            Relation::Resolved(ids) => ids.clone(),
            Relation::Failed(error) => return Err(async_graphql::Error::new(error.to_string())),
            Relation::NotRequested | Relation::Pending => {
                let edges = match direction {
                    Direction::SubscribedTo => {
                        loaders.subscriptions_by_subscriber.load(self.inner.id).await?
                    }
                    Direction::Subscribers => {
                        loaders.subscriptions_by_author.load(self.inner.id).await?
                    }
                };
                edges
                    .unwrap_or_default()
                    .iter()
                    .map(|edge| direction.other_end(edge))
                    .collect()
            }
        };

        let users = loaders.user.load_many(ids).await?;
        Ok(users.into_iter().flatten().map(User::from).collect())
    }
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self::new(user)
    }
}

#[Object]
impl User {
    /// Unique user identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Display name
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Account balance
    async fn balance(&self) -> f64 {
        self.inner.balance
    }

    /// The user's profile, if they created one
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let loaders = ctx.data::<Loaders>()?;
        let profile = loaders.profile_by_user.load(self.inner.id).await?;
        Ok(profile.map(Profile::from))
    }

    /// Posts written by the user
    async fn posts(&self, ctx: &Context<'_>) -> Result<Option<Vec<Post>>> {
        let loaders = ctx.data::<Loaders>()?;
        let posts = loaders.posts_by_author.load(self.inner.id).await?;
        Ok(Some(
            posts.unwrap_or_default().into_iter().map(Post::from).collect(),
        ))
    }

    /// Authors this user is subscribed to
    async fn user_subscribed_to(&self, ctx: &Context<'_>) -> Result<Option<Vec<User>>> {
        self.related_users(ctx, Direction::SubscribedTo).await.map(Some)
    }

    /// Users subscribed to this user
    async fn subscribed_to_user(&self, ctx: &Context<'_>) -> Result<Option<Vec<User>>> {
        self.related_users(ctx, Direction::Subscribers).await.map(Some)
    }
}
