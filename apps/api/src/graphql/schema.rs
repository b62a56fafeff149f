//! GraphQL schema builder for Murmur
//!
//! The schema itself is built once at startup and only carries the
//! storage backend. Loaders are per request and are attached by
//! [`GraphQLService`](super::GraphQLService), never here.

use async_graphql::{EmptySubscription, Schema};

use crate::storage::SharedStorage;

use super::mutation::Mutation;
use super::query::Query;

/// The Murmur GraphQL schema type
pub type MurmurSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builder for constructing the GraphQL schema
pub struct SchemaBuilder {
    storage: SharedStorage,
    introspection: bool,
}

impl SchemaBuilder {
    /// Create a new schema builder over a storage backend
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            introspection: true,
        }
    }

    /// Disable introspection queries
    pub fn disable_introspection(mut self) -> Self {
        self.introspection = false;
        self
    }

    /// Build the schema
    pub fn build(self) -> MurmurSchema {
        let mut builder = Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .data(self.storage);

        if !self.introspection {
            builder = builder.disable_introspection();
        }

        builder.finish()
    }
}

/// Create a new GraphQL schema over the provided storage
pub fn build_schema(storage: SharedStorage) -> MurmurSchema {
    SchemaBuilder::new(storage).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::storage::MemoryStorage;

    #[test]
    fn test_sdl_exposes_root_fields() {
        let schema = build_schema(Arc::new(MemoryStorage::new()));
        let sdl = schema.sdl();

        for field in [
            "memberTypes",
            "users",
            "userSubscribedTo",
            "subscribedToUser",
            "createProfile",
            "unsubscribeFrom",
        ] {
            assert!(sdl.contains(field), "missing {field} in schema");
        }
    }

    #[test]
    fn test_builder_defaults_to_introspection() {
        let builder = SchemaBuilder::new(Arc::new(MemoryStorage::new()));
        assert!(builder.introspection);
    }
}
