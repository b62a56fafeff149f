//! Post GraphQL type

use async_graphql::Object;
use uuid::Uuid;

use crate::models::Post as DbPost;

/// Post exposed via GraphQL
pub struct Post {
    inner: DbPost,
}

impl Post {
    pub fn new(post: DbPost) -> Self {
        Self { inner: post }
    }
}

impl From<DbPost> for Post {
    fn from(post: DbPost) -> Self {
        Self::new(post)
    }
}

#[Object]
impl Post {
    /// Unique post identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Post title
    async fn title(&self) -> &str {
        &self.inner.title
    }

    /// Post body
    async fn content(&self) -> &str {
        &self.inner.content
    }

    /// Author's user id
    async fn author_id(&self) -> Uuid {
        self.inner.author_id
    }
}
