//! Profile batch functions
//!
//! Profiles are reachable three ways: by their own id, by the owning user
//! (at most one per user) and by membership tier.

use std::collections::HashMap;

use uuid::Uuid;

use crate::graphql::dataloader::{BatchFn, BatchLoader, Grouped, GroupedBatchFn};
use crate::models::{MemberTypeId, Profile};
use crate::storage::{SharedStorage, StorageError};

/// Batches profile lookups by id
#[derive(Clone)]
pub struct ProfileBatch {
    storage: SharedStorage,
}

impl ProfileBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl BatchFn<Uuid> for ProfileBatch {
    type Value = Profile;
    type Error = StorageError;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let profiles = self.storage.find_profiles_by_ids(keys).await?;
        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Batches profile lookups by owning user id
#[derive(Clone)]
pub struct ProfileByUserBatch {
    storage: SharedStorage,
}

impl ProfileByUserBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl BatchFn<Uuid> for ProfileByUserBatch {
    type Value = Profile;
    type Error = StorageError;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let profiles = self.storage.find_profiles_by_user_ids(keys).await?;
        Ok(profiles.into_iter().map(|p| (p.user_id, p)).collect())
    }
}

/// Batches "profiles on tier" lookups
#[derive(Clone)]
pub struct ProfilesByMemberTypeBatch {
    storage: SharedStorage,
}

impl ProfilesByMemberTypeBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl GroupedBatchFn<MemberTypeId> for ProfilesByMemberTypeBatch {
    type Row = Profile;
    type Error = StorageError;

    async fn load_rows(&self, keys: &[MemberTypeId]) -> Result<Vec<Self::Row>, Self::Error> {
        self.storage.find_profiles_by_member_type_ids(keys).await
    }

    fn group_key(row: &Profile) -> MemberTypeId {
        row.member_type_id
    }
}

/// Loader for profiles by id
pub type ProfileLoader = BatchLoader<Uuid, ProfileBatch>;

/// Loader for the profile of each user
pub type ProfileByUserLoader = BatchLoader<Uuid, ProfileByUserBatch>;

/// Loader for the profiles on each membership tier
pub type ProfilesByMemberTypeLoader =
    BatchLoader<MemberTypeId, Grouped<ProfilesByMemberTypeBatch>>;
