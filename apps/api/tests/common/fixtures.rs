//! Test fixtures for API integration tests
//!
//! Provides a small social graph in a `MemoryStorage`:
//!
//! - alice (BASIC profile, two posts) follows bob and carol
//! - bob (BUSINESS profile, one post) follows carol
//! - carol has no profile and no posts

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use murmur_api::models::{MemberTypeId, Post, Profile, User};
use murmur_api::storage::MemoryStorage;

/// Seeded storage plus the ids of the seeded rows
pub struct Dataset {
    pub storage: Arc<MemoryStorage>,
    pub alice: Uuid,
    pub bob: Uuid,
    pub carol: Uuid,
    pub alice_profile: Uuid,
    pub bob_profile: Uuid,
}

impl Dataset {
    /// Seed a fresh store and clear the call log
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let (alice, bob, carol) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        storage.insert_user(User::new(alice, "alice", 100.0));
        storage.insert_user(User::new(bob, "bob", 50.5));
        storage.insert_user(User::new(carol, "carol", 0.0));

        storage.insert_post(post(alice, "Hello"));
        storage.insert_post(post(bob, "Hi there"));
        storage.insert_post(post(alice, "Again"));

        let alice_profile = Uuid::new_v4();
        let bob_profile = Uuid::new_v4();
        storage.insert_profile(Profile {
            id: alice_profile,
            is_male: false,
            year_of_birth: 1990,
            user_id: alice,
            member_type_id: MemberTypeId::Basic,
        });
        storage.insert_profile(Profile {
            id: bob_profile,
            is_male: true,
            year_of_birth: 1985,
            user_id: bob,
            member_type_id: MemberTypeId::Business,
        });

        storage.insert_subscription(alice, bob);
        storage.insert_subscription(alice, carol);
        storage.insert_subscription(bob, carol);

        storage.clear_calls();

        Self {
            storage,
            alice,
            bob,
            carol,
            alice_profile,
            bob_profile,
        }
    }

    /// Number of calls made to a storage method so far
    pub fn calls(&self, method: &str) -> usize {
        self.storage.calls_to(method).len()
    }

    /// Key counts of the calls made to a storage method so far
    pub fn batch_sizes(&self, method: &str) -> Vec<usize> {
        self.storage
            .calls_to(method)
            .into_iter()
            .map(|call| call.keys)
            .collect()
    }
}

/// A post row with generated id
pub fn post(author_id: Uuid, title: &str) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: format!("{title} (content)"),
        author_id,
    }
}

/// A query nesting `userSubscribedTo` below `users` until `depth` is reached
pub fn nested_users_query(depth: usize) -> String {
    let mut query = String::from("{ users { ");
    for _ in 1..depth {
        query.push_str("userSubscribedTo { ");
    }
    query.push_str("id");
    for _ in 0..depth {
        query.push_str(" }");
    }
    query.push_str(" }");
    query
}
