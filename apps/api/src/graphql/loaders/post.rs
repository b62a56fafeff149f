//! Post batch functions

use std::collections::HashMap;

use uuid::Uuid;

use crate::graphql::dataloader::{BatchFn, BatchLoader, Grouped, GroupedBatchFn};
use crate::models::Post;
use crate::storage::{SharedStorage, StorageError};

/// Batches post lookups by id
#[derive(Clone)]
pub struct PostBatch {
    storage: SharedStorage,
}

impl PostBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl BatchFn<Uuid> for PostBatch {
    type Value = Post;
    type Error = StorageError;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let posts = self.storage.find_posts_by_ids(keys).await?;
        Ok(posts.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Batches "posts written by" lookups, one storage call for all authors
#[derive(Clone)]
pub struct PostsByAuthorBatch {
    storage: SharedStorage,
}

impl PostsByAuthorBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl GroupedBatchFn<Uuid> for PostsByAuthorBatch {
    type Row = Post;
    type Error = StorageError;

    async fn load_rows(&self, keys: &[Uuid]) -> Result<Vec<Self::Row>, Self::Error> {
        self.storage.find_posts_by_author_ids(keys).await
    }

    fn group_key(row: &Post) -> Uuid {
        row.author_id
    }
}

/// Loader for posts by id
pub type PostLoader = BatchLoader<Uuid, PostBatch>;

/// Loader for the posts of each author
pub type PostsByAuthorLoader = BatchLoader<Uuid, Grouped<PostsByAuthorBatch>>;
