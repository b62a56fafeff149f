//! Per-request loader registry
//!
//! Every loader here wraps a batch function over the storage backend.
//! A [`Loaders`] value is built for exactly one GraphQL request and handed
//! to the resolvers through the request data, so no cached value can leak
//! into another request.
//!
//! There are two kinds of loaders:
//! - Single-entity loaders: resolve a key to `Option<T>`
//! - Grouping loaders: resolve a parent key to the `Vec<T>` of its children

mod member_type;
mod post;
mod profile;
mod subscriptions;
mod user;

pub use member_type::{MemberTypeBatch, MemberTypeLoader};
pub use post::{PostBatch, PostLoader, PostsByAuthorBatch, PostsByAuthorLoader};
pub use profile::{
    ProfileBatch, ProfileByUserBatch, ProfileByUserLoader, ProfileLoader,
    ProfilesByMemberTypeBatch, ProfilesByMemberTypeLoader,
};
pub use subscriptions::{
    SubscriptionsByAuthorBatch, SubscriptionsByAuthorLoader, SubscriptionsBySubscriberBatch,
    SubscriptionsBySubscriberLoader,
};
pub use user::{UserBatch, UserLoader};

use crate::graphql::dataloader::{BatchLoader, Grouped};
use crate::storage::SharedStorage;

/// Fresh loaders for one request
pub struct Loaders {
    pub user: UserLoader,
    pub post: PostLoader,
    pub posts_by_author: PostsByAuthorLoader,
    pub profile: ProfileLoader,
    pub profile_by_user: ProfileByUserLoader,
    pub profiles_by_member_type: ProfilesByMemberTypeLoader,
    pub member_type: MemberTypeLoader,
    pub subscriptions_by_subscriber: SubscriptionsBySubscriberLoader,
    pub subscriptions_by_author: SubscriptionsByAuthorLoader,
}

impl Loaders {
    /// Create every loader with an empty cache
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            user: BatchLoader::new(UserBatch::new(storage.clone())),
            post: BatchLoader::new(PostBatch::new(storage.clone())),
            posts_by_author: BatchLoader::new(Grouped(PostsByAuthorBatch::new(storage.clone()))),
            profile: BatchLoader::new(ProfileBatch::new(storage.clone())),
            profile_by_user: BatchLoader::new(ProfileByUserBatch::new(storage.clone())),
            profiles_by_member_type: BatchLoader::new(Grouped(ProfilesByMemberTypeBatch::new(
                storage.clone(),
            ))),
            member_type: BatchLoader::new(MemberTypeBatch::new(storage.clone())),
            subscriptions_by_subscriber: BatchLoader::new(Grouped(
                SubscriptionsBySubscriberBatch::new(storage.clone()),
            )),
            subscriptions_by_author: BatchLoader::new(Grouped(SubscriptionsByAuthorBatch::new(
                storage,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use uuid::Uuid;

    use crate::models::{MemberTypeId, Post, User};
    use crate::storage::MemoryStorage;

    fn post(author_id: Uuid, title: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: String::new(),
            author_id,
        }
    }

    #[tokio::test]
    async fn test_fresh_loaders_fetch_again() {
        let storage = Arc::new(MemoryStorage::new());
        let id = Uuid::new_v4();
        storage.insert_user(User::new(id, "alice", 10.0));

        let first = Loaders::new(storage.clone());
        assert!(first.user.load(id).await.unwrap().is_some());
        assert!(first.user.load(id).await.unwrap().is_some());

        let second = Loaders::new(storage.clone());
        assert!(second.user.load(id).await.unwrap().is_some());

        assert_eq!(storage.calls_to("find_users_by_ids").len(), 2);
    }

    #[tokio::test]
    async fn test_posts_by_author_groups_rows() {
        let storage = Arc::new(MemoryStorage::new());
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        storage.insert_post(post(a, "first"));
        storage.insert_post(post(b, "second"));
        storage.insert_post(post(a, "third"));

        let loaders = Loaders::new(storage.clone());
        let groups = loaders
            .posts_by_author
            .load_many(vec![a, b, c])
            .await
            .unwrap();

        let titles: Vec<Vec<String>> = groups
            .into_iter()
            .map(|g| g.unwrap().into_iter().map(|p| p.title).collect())
            .collect();
        assert_eq!(
            titles,
            vec![
                vec!["first".to_string(), "third".to_string()],
                vec!["second".to_string()],
                vec![],
            ]
        );
        assert_eq!(storage.calls_to("find_posts_by_author_ids").len(), 1);
    }

    #[tokio::test]
    async fn test_member_type_loader_reads_seeded_tiers() {
        let storage = Arc::new(MemoryStorage::new());
        let loaders = Loaders::new(storage.clone());

        let (basic, business) = tokio::join!(
            loaders.member_type.load(MemberTypeId::Basic),
            loaders.member_type.load(MemberTypeId::Business)
        );

        assert_eq!(basic.unwrap().unwrap().posts_limit_per_month, 20);
        assert_eq!(business.unwrap().unwrap().posts_limit_per_month, 100);
        assert_eq!(storage.calls_to("find_member_types_by_ids").len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_shared_by_batch() {
        let storage = Arc::new(MemoryStorage::new());
        storage.fail_on("find_posts_by_ids");
        let loaders = Loaders::new(storage.clone());

        let (a, b) = tokio::join!(
            loaders.post.load(Uuid::new_v4()),
            loaders.post.load(Uuid::new_v4())
        );

        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(storage.calls_to("find_posts_by_ids").len(), 1);
    }
}
