//! Storage collaborator for the GraphQL layer
//!
//! The resolution layer only ever talks to storage through the [`Storage`]
//! trait. Batched loaders depend on the "id in set" finders; root fields
//! and mutations use the rest.
//!
//! Two backends exist:
//! - [`PostgresStorage`]: the production backend built on the sqlx repositories
//! - [`MemoryStorage`]: in-process tables, used for development and tests

mod memory;
mod postgres;

pub use memory::{MemoryStorage, StorageCall};
pub use postgres::PostgresStorage;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile, Relation,
    Subscription, UpdatePost, UpdateProfile, UpdateUser, User, UserInclude,
};

/// Errors surfaced by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The targeted row does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The write violates a uniqueness or reference constraint
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend cannot serve requests right now
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Create a not found error for a specific entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Map a write error, turning constraint violations into `Conflict`
    pub(crate) fn from_write(error: sqlx::Error) -> Self {
        if crate::repositories::utils::is_constraint_violation(&error) {
            Self::Conflict(error.to_string())
        } else {
            Self::Database(error)
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle to the configured storage backend
pub type SharedStorage = Arc<dyn Storage>;

/// Relational store exposing find-many, create, update and delete per entity
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Verify the backend is reachable
    async fn ping(&self) -> StorageResult<()>;

    // ---- users ----

    /// All users, attaching the requested subscription relations
    async fn find_users(&self, include: UserInclude) -> StorageResult<Vec<User>>;

    /// Users whose id is in `ids`, with both subscription relations attached
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<User>>;

    async fn create_user(&self, input: CreateUser) -> StorageResult<User>;

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<User>;

    async fn delete_user(&self, id: Uuid) -> StorageResult<User>;

    // ---- posts ----

    async fn find_posts(&self) -> StorageResult<Vec<Post>>;

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Post>>;

    async fn find_posts_by_author_ids(&self, author_ids: &[Uuid]) -> StorageResult<Vec<Post>>;

    async fn create_post(&self, input: CreatePost) -> StorageResult<Post>;

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StorageResult<Post>;

    async fn delete_post(&self, id: Uuid) -> StorageResult<Post>;

    // ---- profiles ----

    async fn find_profiles(&self) -> StorageResult<Vec<Profile>>;

    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Profile>>;

    async fn find_profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StorageResult<Vec<Profile>>;

    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> StorageResult<Vec<Profile>>;

    async fn create_profile(&self, input: CreateProfile) -> StorageResult<Profile>;

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StorageResult<Profile>;

    async fn delete_profile(&self, id: Uuid) -> StorageResult<Profile>;

    // ---- member types ----

    async fn find_member_types(&self) -> StorageResult<Vec<MemberType>>;

    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> StorageResult<Vec<MemberType>>;

    // ---- subscriptions ----

    async fn find_subscriptions_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>>;

    async fn find_subscriptions_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>>;

    /// Record that `subscriber_id` follows `author_id`, returning the subscriber
    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<User>;

    /// Remove a subscription edge
    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<()>;
}

/// Attach subscription relations to `users` from already fetched edges
///
/// Every user gets a `Resolved` list (possibly empty) for each relation
/// whose edges were fetched. A failed edge query marks the relation
/// `Failed` instead of discarding the users. An included relation without
/// edges stays `Pending`, which resolvers load through the edge loaders.
pub(crate) fn attach_subscriptions(
    users: &mut [User],
    include: UserInclude,
    subscribed_to: Option<StorageResult<Vec<Subscription>>>,
    subscribers: Option<StorageResult<Vec<Subscription>>>,
) {
    attach_edges(
        users,
        include.subscribed_to,
        subscribed_to,
        |edge| (edge.subscriber_id, edge.author_id),
        |user| &mut user.subscribed_to,
        "subscribed-to",
    );
    attach_edges(
        users,
        include.subscribers,
        subscribers,
        |edge| (edge.author_id, edge.subscriber_id),
        |user| &mut user.subscribers,
        "subscriber",
    );
}

/// Fill one relation of every user; `ends` maps an edge to (owner, other end)
fn attach_edges(
    users: &mut [User],
    included: bool,
    edges: Option<StorageResult<Vec<Subscription>>>,
    ends: fn(&Subscription) -> (Uuid, Uuid),
    relation: fn(&mut User) -> &mut Relation<Vec<Uuid>>,
    kind: &'static str,
) {
    match edges {
        Some(Ok(edges)) => {
            let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            for edge in &edges {
                let (owner, other) = ends(edge);
                grouped.entry(owner).or_default().push(other);
            }
            for user in users.iter_mut() {
                let ids = grouped.remove(&user.id).unwrap_or_default();
                *relation(user) = Relation::Resolved(ids);
            }
        }
        Some(Err(error)) => {
            tracing::error!(error = %error, kind, "Failed to fetch subscription edges");
            let failed = Relation::failed(&error);
            for user in users.iter_mut() {
                *relation(user) = failed.clone();
            }
        }
        None if included => {
            for user in users.iter_mut() {
                *relation(user) = Relation::Pending;
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_subscriptions_resolves_every_user() {
        let a = User::new(Uuid::new_v4(), "a", 0.0);
        let b = User::new(Uuid::new_v4(), "b", 0.0);
        let edge = Subscription {
            subscriber_id: a.id,
            author_id: b.id,
        };
        let mut users = vec![a.clone(), b.clone()];

        attach_subscriptions(
            &mut users,
            UserInclude::all(),
            Some(Ok(vec![edge])),
            Some(Ok(vec![edge])),
        );

        assert_eq!(users[0].subscribed_to, Relation::Resolved(vec![b.id]));
        assert_eq!(users[0].subscribers, Relation::Resolved(vec![]));
        assert_eq!(users[1].subscribed_to, Relation::Resolved(vec![]));
        assert_eq!(users[1].subscribers, Relation::Resolved(vec![a.id]));
    }

    #[test]
    fn test_attach_subscriptions_marks_failure() {
        let mut users = vec![User::new(Uuid::new_v4(), "a", 0.0)];

        attach_subscriptions(
            &mut users,
            UserInclude {
                subscribed_to: true,
                subscribers: false,
            },
            Some(Err(StorageError::Unavailable("down".into()))),
            None,
        );

        assert!(matches!(users[0].subscribed_to, Relation::Failed(_)));
        assert_eq!(users[0].subscribers, Relation::NotRequested);
    }

    #[test]
    fn test_attach_subscriptions_leaves_unfetched_relation_pending() {
        let mut users = vec![User::new(Uuid::new_v4(), "a", 0.0)];

        attach_subscriptions(&mut users, UserInclude::all(), Some(Ok(vec![])), None);

        assert_eq!(users[0].subscribed_to, Relation::Resolved(vec![]));
        assert_eq!(users[0].subscribers, Relation::Pending);
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::not_found("user", "abc");
        assert_eq!(err.to_string(), "user not found: abc");
    }
}
