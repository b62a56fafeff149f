//! PostgreSQL storage backend
//!
//! Composes the per-table repositories behind the [`Storage`] trait. Batched
//! finders map directly onto `= ANY($1)` queries; eager user relations are
//! fetched with one extra edge query per relation, issued concurrently.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{attach_subscriptions, Storage, StorageError, StorageResult};
use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile, Subscription,
    UpdatePost, UpdateProfile, UpdateUser, User, UserInclude,
};
use crate::repositories::{
    MemberTypeRepository, PostRepository, ProfileRepository, SubscriptionRepository,
    UserRepository,
};

/// Storage backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PostgresStorage {
    users: UserRepository,
    posts: PostRepository,
    profiles: ProfileRepository,
    member_types: MemberTypeRepository,
    subscriptions: SubscriptionRepository,
}

impl PostgresStorage {
    /// Create a storage backend sharing the given pool across repositories
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            member_types: MemberTypeRepository::new(pool.clone()),
            subscriptions: SubscriptionRepository::new(pool),
        }
    }

    async fn with_relations(
        &self,
        mut users: Vec<User>,
        include: UserInclude,
    ) -> StorageResult<Vec<User>> {
        if users.is_empty() || !include.any() {
            return Ok(users);
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let (subscribed_to, subscribers) = tokio::join!(
            async {
                if include.subscribed_to {
                    Some(
                        self.subscriptions
                            .find_by_subscriber_ids(&ids)
                            .await
                            .map_err(StorageError::from),
                    )
                } else {
                    None
                }
            },
            async {
                if include.subscribers {
                    Some(
                        self.subscriptions
                            .find_by_author_ids(&ids)
                            .await
                            .map_err(StorageError::from),
                    )
                } else {
                    None
                }
            }
        );

        attach_subscriptions(&mut users, include, subscribed_to, subscribers);
        Ok(users)
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn ping(&self) -> StorageResult<()> {
        self.users.ping().await.map_err(StorageError::from)
    }

    async fn find_users(&self, include: UserInclude) -> StorageResult<Vec<User>> {
        let users = self.users.find_all().await?;
        self.with_relations(users, include).await
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.users.find_by_ids(ids).await?;
        self.with_relations(users, UserInclude::all()).await
    }

    async fn create_user(&self, input: CreateUser) -> StorageResult<User> {
        self.users
            .create(&input)
            .await
            .map_err(StorageError::from_write)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<User> {
        self.users
            .update(id, &input)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("user", id))
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<User> {
        self.users
            .delete(id)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("user", id))
    }

    async fn find_posts(&self) -> StorageResult<Vec<Post>> {
        Ok(self.posts.find_all().await?)
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Post>> {
        Ok(self.posts.find_by_ids(ids).await?)
    }

    async fn find_posts_by_author_ids(&self, author_ids: &[Uuid]) -> StorageResult<Vec<Post>> {
        Ok(self.posts.find_by_author_ids(author_ids).await?)
    }

    async fn create_post(&self, input: CreatePost) -> StorageResult<Post> {
        self.posts
            .create(&input)
            .await
            .map_err(StorageError::from_write)
    }

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StorageResult<Post> {
        self.posts
            .update(id, &input)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("post", id))
    }

    async fn delete_post(&self, id: Uuid) -> StorageResult<Post> {
        self.posts
            .delete(id)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("post", id))
    }

    async fn find_profiles(&self) -> StorageResult<Vec<Profile>> {
        Ok(self.profiles.find_all().await?)
    }

    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Profile>> {
        Ok(self.profiles.find_by_ids(ids).await?)
    }

    async fn find_profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StorageResult<Vec<Profile>> {
        Ok(self.profiles.find_by_user_ids(user_ids).await?)
    }

    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> StorageResult<Vec<Profile>> {
        Ok(self
            .profiles
            .find_by_member_type_ids(member_type_ids)
            .await?)
    }

    async fn create_profile(&self, input: CreateProfile) -> StorageResult<Profile> {
        self.profiles
            .create(&input)
            .await
            .map_err(StorageError::from_write)
    }

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StorageResult<Profile> {
        self.profiles
            .update(id, &input)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("profile", id))
    }

    async fn delete_profile(&self, id: Uuid) -> StorageResult<Profile> {
        self.profiles
            .delete(id)
            .await
            .map_err(StorageError::from_write)?
            .ok_or_else(|| StorageError::not_found("profile", id))
    }

    async fn find_member_types(&self) -> StorageResult<Vec<MemberType>> {
        Ok(self.member_types.find_all().await?)
    }

    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> StorageResult<Vec<MemberType>> {
        Ok(self.member_types.find_by_ids(ids).await?)
    }

    async fn find_subscriptions_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .find_by_subscriber_ids(subscriber_ids)
            .await?)
    }

    async fn find_subscriptions_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>> {
        Ok(self.subscriptions.find_by_author_ids(author_ids).await?)
    }

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<User> {
        self.subscriptions
            .create(Subscription {
                subscriber_id,
                author_id,
            })
            .await
            .map_err(StorageError::from_write)?;

        self.find_users_by_ids(&[subscriber_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::not_found("user", subscriber_id))
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<()> {
        self.subscriptions
            .delete(Subscription {
                subscriber_id,
                author_id,
            })
            .await
            .map_err(StorageError::from_write)?
            .map(|_| ())
            .ok_or_else(|| {
                StorageError::not_found("subscription", format!("{subscriber_id}->{author_id}"))
            })
    }
}
