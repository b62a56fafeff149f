//! Murmur API library
//!
//! This module exposes the core API components for use in integration tests
//! and by the server binary.

pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use graphql::{GraphQLService, Loaders, MurmurSchema};
pub use storage::{MemoryStorage, PostgresStorage, SharedStorage, Storage, StorageError};
