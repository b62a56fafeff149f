//! Membership tier batch function

use std::collections::HashMap;

use crate::graphql::dataloader::{BatchFn, BatchLoader};
use crate::models::{MemberType, MemberTypeId};
use crate::storage::{SharedStorage, StorageError};

/// Batches membership tier lookups by id
#[derive(Clone)]
pub struct MemberTypeBatch {
    storage: SharedStorage,
}

impl MemberTypeBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl BatchFn<MemberTypeId> for MemberTypeBatch {
    type Value = MemberType;
    type Error = StorageError;

    async fn load(
        &self,
        keys: &[MemberTypeId],
    ) -> Result<HashMap<MemberTypeId, Self::Value>, Self::Error> {
        let member_types = self.storage.find_member_types_by_ids(keys).await?;
        Ok(member_types.into_iter().map(|m| (m.id, m)).collect())
    }
}

/// Loader for membership tiers by id
pub type MemberTypeLoader = BatchLoader<MemberTypeId, MemberTypeBatch>;
