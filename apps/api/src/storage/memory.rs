//! In-memory storage backend
//!
//! Keeps every table in a `Vec` behind a lock. Besides serving
//! `STORAGE_BACKEND=memory`, it records each call (method name and number
//! of keys) and can be told to fail specific methods, which is what the
//! batching and partial-failure tests assert against.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{attach_subscriptions, Storage, StorageError, StorageResult};
use crate::models::{
    CreatePost, CreateProfile, CreateUser, MemberType, MemberTypeId, Post, Profile, Subscription,
    UpdatePost, UpdateProfile, UpdateUser, User, UserInclude,
};

/// One recorded storage call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCall {
    /// Trait method name, e.g. `find_users_by_ids`
    pub method: &'static str,
    /// Number of keys passed to a batched finder (0 for other calls)
    pub keys: usize,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    profiles: Vec<Profile>,
    member_types: Vec<MemberType>,
    subscriptions: Vec<Subscription>,
}

/// Storage kept entirely in process memory
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
    calls: Mutex<Vec<StorageCall>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStorage {
    /// Create a store seeded with the default membership tiers
    pub fn new() -> Self {
        let storage = Self::default();
        storage.write().member_types = MemberType::defaults();
        storage
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, method: &'static str, keys: usize) -> StorageResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StorageCall { method, keys });

        let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing.contains(method) {
            return Err(StorageError::Unavailable(format!("{method} is failing")));
        }
        Ok(())
    }

    // ---- fixtures ----

    /// Insert a user row as is
    pub fn insert_user(&self, user: User) {
        self.write().users.push(user);
    }

    /// Insert a post row as is
    pub fn insert_post(&self, post: Post) {
        self.write().posts.push(post);
    }

    /// Insert a profile row as is
    pub fn insert_profile(&self, profile: Profile) {
        self.write().profiles.push(profile);
    }

    /// Insert a subscription edge as is
    pub fn insert_subscription(&self, subscriber_id: Uuid, author_id: Uuid) {
        self.write().subscriptions.push(Subscription {
            subscriber_id,
            author_id,
        });
    }

    // ---- instrumentation ----

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls made to one method
    pub fn calls_to(&self, method: &str) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make every subsequent call to `method` fail with `Unavailable`
    pub fn fail_on(&self, method: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method);
    }

    /// Stop failing calls to `method`
    pub fn recover(&self, method: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(method);
    }

    fn users_with_relations(&self, users: Vec<User>, include: UserInclude) -> Vec<User> {
        let mut users: Vec<User> = users
            .into_iter()
            .map(|user| User::new(user.id, user.name, user.balance))
            .collect();
        if !include.any() {
            return users;
        }

        let edges = self.read().subscriptions.clone();
        attach_subscriptions(
            &mut users,
            include,
            include.subscribed_to.then(|| Ok(edges.clone())),
            include.subscribers.then(|| Ok(edges)),
        );
        users
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> StorageResult<()> {
        self.record("ping", 0)
    }

    async fn find_users(&self, include: UserInclude) -> StorageResult<Vec<User>> {
        self.record("find_users", 0)?;
        let users = self.read().users.clone();
        Ok(self.users_with_relations(users, include))
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<User>> {
        self.record("find_users_by_ids", ids.len())?;
        let users: Vec<User> = self
            .read()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect();
        Ok(self.users_with_relations(users, UserInclude::all()))
    }

    async fn create_user(&self, input: CreateUser) -> StorageResult<User> {
        self.record("create_user", 0)?;
        let user = User::new(Uuid::new_v4(), input.name, input.balance);
        self.write().users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<User> {
        self.record("update_user", 0)?;
        let mut tables = self.write();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StorageError::not_found("user", id))?;
        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(balance) = input.balance {
            user.balance = balance;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<User> {
        self.record("delete_user", 0)?;
        let mut tables = self.write();
        let index = tables
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StorageError::not_found("user", id))?;
        let user = tables.users.remove(index);
        tables.posts.retain(|p| p.author_id != id);
        tables.profiles.retain(|p| p.user_id != id);
        tables
            .subscriptions
            .retain(|s| s.subscriber_id != id && s.author_id != id);
        Ok(user)
    }

    async fn find_posts(&self) -> StorageResult<Vec<Post>> {
        self.record("find_posts", 0)?;
        Ok(self.read().posts.clone())
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Post>> {
        self.record("find_posts_by_ids", ids.len())?;
        Ok(self
            .read()
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_posts_by_author_ids(&self, author_ids: &[Uuid]) -> StorageResult<Vec<Post>> {
        self.record("find_posts_by_author_ids", author_ids.len())?;
        Ok(self
            .read()
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.author_id))
            .cloned()
            .collect())
    }

    async fn create_post(&self, input: CreatePost) -> StorageResult<Post> {
        self.record("create_post", 0)?;
        let mut tables = self.write();
        if !tables.users.iter().any(|u| u.id == input.author_id) {
            return Err(StorageError::Conflict(format!(
                "author {} does not exist",
                input.author_id
            )));
        }
        let post = Post {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, input: UpdatePost) -> StorageResult<Post> {
        self.record("update_post", 0)?;
        let mut tables = self.write();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("post", id))?;
        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StorageResult<Post> {
        self.record("delete_post", 0)?;
        let mut tables = self.write();
        let index = tables
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("post", id))?;
        Ok(tables.posts.remove(index))
    }

    async fn find_profiles(&self) -> StorageResult<Vec<Profile>> {
        self.record("find_profiles", 0)?;
        Ok(self.read().profiles.clone())
    }

    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> StorageResult<Vec<Profile>> {
        self.record("find_profiles_by_ids", ids.len())?;
        Ok(self
            .read()
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StorageResult<Vec<Profile>> {
        self.record("find_profiles_by_user_ids", user_ids.len())?;
        Ok(self
            .read()
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> StorageResult<Vec<Profile>> {
        self.record("find_profiles_by_member_type_ids", member_type_ids.len())?;
        Ok(self
            .read()
            .profiles
            .iter()
            .filter(|p| member_type_ids.contains(&p.member_type_id))
            .cloned()
            .collect())
    }

    async fn create_profile(&self, input: CreateProfile) -> StorageResult<Profile> {
        self.record("create_profile", 0)?;
        let mut tables = self.write();
        if !tables.users.iter().any(|u| u.id == input.user_id) {
            return Err(StorageError::Conflict(format!(
                "user {} does not exist",
                input.user_id
            )));
        }
        if tables.profiles.iter().any(|p| p.user_id == input.user_id) {
            return Err(StorageError::Conflict(format!(
                "user {} already has a profile",
                input.user_id
            )));
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            user_id: input.user_id,
            member_type_id: input.member_type_id,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> StorageResult<Profile> {
        self.record("update_profile", 0)?;
        let mut tables = self.write();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("profile", id))?;
        if let Some(is_male) = input.is_male {
            profile.is_male = is_male;
        }
        if let Some(year_of_birth) = input.year_of_birth {
            profile.year_of_birth = year_of_birth;
        }
        if let Some(member_type_id) = input.member_type_id {
            profile.member_type_id = member_type_id;
        }
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> StorageResult<Profile> {
        self.record("delete_profile", 0)?;
        let mut tables = self.write();
        let index = tables
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("profile", id))?;
        Ok(tables.profiles.remove(index))
    }

    async fn find_member_types(&self) -> StorageResult<Vec<MemberType>> {
        self.record("find_member_types", 0)?;
        Ok(self.read().member_types.clone())
    }

    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> StorageResult<Vec<MemberType>> {
        self.record("find_member_types_by_ids", ids.len())?;
        Ok(self
            .read()
            .member_types
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn find_subscriptions_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>> {
        self.record("find_subscriptions_by_subscriber_ids", subscriber_ids.len())?;
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| subscriber_ids.contains(&s.subscriber_id))
            .copied()
            .collect())
    }

    async fn find_subscriptions_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StorageResult<Vec<Subscription>> {
        self.record("find_subscriptions_by_author_ids", author_ids.len())?;
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| author_ids.contains(&s.author_id))
            .copied()
            .collect())
    }

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<User> {
        self.record("subscribe", 0)?;
        let subscriber = {
            let mut tables = self.write();
            let subscriber = tables
                .users
                .iter()
                .find(|u| u.id == subscriber_id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("user", subscriber_id))?;
            if !tables.users.iter().any(|u| u.id == author_id) {
                return Err(StorageError::Conflict(format!(
                    "author {author_id} does not exist"
                )));
            }
            let edge = Subscription {
                subscriber_id,
                author_id,
            };
            if tables.subscriptions.contains(&edge) {
                return Err(StorageError::Conflict(format!(
                    "{subscriber_id} is already subscribed to {author_id}"
                )));
            }
            tables.subscriptions.push(edge);
            subscriber
        };

        let mut users = self.users_with_relations(vec![subscriber], UserInclude::all());
        Ok(users.remove(0))
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StorageResult<()> {
        self.record("unsubscribe", 0)?;
        let mut tables = self.write();
        let edge = Subscription {
            subscriber_id,
            author_id,
        };
        let index = tables
            .subscriptions
            .iter()
            .position(|s| *s == edge)
            .ok_or_else(|| {
                StorageError::not_found("subscription", format!("{subscriber_id}->{author_id}"))
            })?;
        tables.subscriptions.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Relation;

    #[tokio::test]
    async fn test_records_calls_and_key_counts() {
        let storage = MemoryStorage::new();
        let id = Uuid::new_v4();
        storage.insert_user(User::new(id, "Ada", 1.0));

        let users = storage.find_users_by_ids(&[id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(
            storage.calls(),
            vec![StorageCall {
                method: "find_users_by_ids",
                keys: 2
            }]
        );
    }

    #[tokio::test]
    async fn test_fail_on_and_recover() {
        let storage = MemoryStorage::new();
        storage.fail_on("find_posts");
        assert!(matches!(
            storage.find_posts().await,
            Err(StorageError::Unavailable(_))
        ));

        storage.recover("find_posts");
        assert!(storage.find_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_users_respects_include() {
        let storage = MemoryStorage::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        storage.insert_user(User::new(a, "a", 0.0));
        storage.insert_user(User::new(b, "b", 0.0));
        storage.insert_subscription(a, b);

        let lazy = storage.find_users(UserInclude::default()).await.unwrap();
        assert!(lazy
            .iter()
            .all(|u| u.subscribed_to == Relation::NotRequested));

        let eager = storage.find_users(UserInclude::all()).await.unwrap();
        assert_eq!(eager[0].subscribed_to, Relation::Resolved(vec![b]));
        assert_eq!(eager[1].subscribers, Relation::Resolved(vec![a]));
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let storage = MemoryStorage::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        storage.insert_user(User::new(a, "a", 0.0));
        storage.insert_user(User::new(b, "b", 0.0));
        storage.insert_subscription(b, a);
        storage.insert_post(Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            author_id: a,
        });

        storage.delete_user(a).await.unwrap();

        assert!(storage.find_posts().await.unwrap().is_empty());
        assert!(storage
            .find_subscriptions_by_subscriber_ids(&[b])
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            storage.delete_user(a).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_profile_is_conflict() {
        let storage = MemoryStorage::new();
        let user = Uuid::new_v4();
        storage.insert_user(User::new(user, "a", 0.0));
        let input = CreateProfile {
            is_male: true,
            year_of_birth: 1990,
            user_id: user,
            member_type_id: MemberTypeId::Basic,
        };

        storage.create_profile(input.clone()).await.unwrap();
        assert!(matches!(
            storage.create_profile(input).await,
            Err(StorageError::Conflict(_))
        ));
    }
}
