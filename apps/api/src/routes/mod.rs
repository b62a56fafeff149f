//! HTTP route handlers for the Murmur API
//!
//! This module contains all HTTP endpoint handlers:
//! - GraphQL endpoint and playground
//! - Health check and readiness endpoints

pub mod graphql;
pub mod health;

pub use graphql::{graphql_router, ErrorMessage, GraphQLBody};
pub use health::{health_router, HealthState};

use axum::Router;

use crate::graphql::GraphQLService;
use crate::storage::SharedStorage;

/// Build the application router without middleware layers
pub fn app_router(service: GraphQLService, storage: SharedStorage) -> Router {
    Router::new()
        .nest("/graphql", graphql_router(service))
        .nest("/health", health_router(HealthState::new(storage)))
}
