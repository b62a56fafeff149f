//! User batch function
//!
//! Users come back with both subscription relations attached, so resolvers
//! below a loaded user never need the edge loaders.

use std::collections::HashMap;

use uuid::Uuid;

use crate::graphql::dataloader::{BatchFn, BatchLoader};
use crate::models::User;
use crate::storage::{SharedStorage, StorageError};

/// Batches user lookups by id
#[derive(Clone)]
pub struct UserBatch {
    storage: SharedStorage,
}

impl UserBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl BatchFn<Uuid> for UserBatch {
    type Value = User;
    type Error = StorageError;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let users = self.storage.find_users_by_ids(keys).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

/// Loader for users by id
pub type UserLoader = BatchLoader<Uuid, UserBatch>;
