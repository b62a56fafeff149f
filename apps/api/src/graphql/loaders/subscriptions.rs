//! Subscription edge batch functions
//!
//! Used for users whose subscription relations were not fetched together
//! with them. Both directions group the same edge rows, by subscriber or
//! by author.

use uuid::Uuid;

use crate::graphql::dataloader::{BatchLoader, Grouped, GroupedBatchFn};
use crate::models::Subscription;
use crate::storage::{SharedStorage, StorageError};

/// Edges grouped by the subscribing user
#[derive(Clone)]
pub struct SubscriptionsBySubscriberBatch {
    storage: SharedStorage,
}

impl SubscriptionsBySubscriberBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl GroupedBatchFn<Uuid> for SubscriptionsBySubscriberBatch {
    type Row = Subscription;
    type Error = StorageError;

    async fn load_rows(&self, keys: &[Uuid]) -> Result<Vec<Self::Row>, Self::Error> {
        self.storage.find_subscriptions_by_subscriber_ids(keys).await
    }

    fn group_key(row: &Subscription) -> Uuid {
        row.subscriber_id
    }
}

/// Edges grouped by the followed author
#[derive(Clone)]
pub struct SubscriptionsByAuthorBatch {
    storage: SharedStorage,
}

impl SubscriptionsByAuthorBatch {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }
}

impl GroupedBatchFn<Uuid> for SubscriptionsByAuthorBatch {
    type Row = Subscription;
    type Error = StorageError;

    async fn load_rows(&self, keys: &[Uuid]) -> Result<Vec<Self::Row>, Self::Error> {
        self.storage.find_subscriptions_by_author_ids(keys).await
    }

    fn group_key(row: &Subscription) -> Uuid {
        row.author_id
    }
}

/// Loader for the edges where each user is the subscriber
pub type SubscriptionsBySubscriberLoader =
    BatchLoader<Uuid, Grouped<SubscriptionsBySubscriberBatch>>;

/// Loader for the edges where each user is the author
pub type SubscriptionsByAuthorLoader = BatchLoader<Uuid, Grouped<SubscriptionsByAuthorBatch>>;
