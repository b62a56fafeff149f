//! GraphQL layer for Murmur
//!
//! This module contains the async-graphql schema and the request-scoped
//! batching around it:
//! - `dataloader`: the batching, deduplicating loader
//! - `loaders`: one loader per entity kind, built fresh per request
//! - `selection` / `depth`: query documents and the depth and size limits
//! - `planner`: eager fetching for root lists
//! - Query, mutation and object types

pub mod dataloader;
pub mod depth;
pub mod loaders;
pub mod mutation;
pub mod planner;
pub mod query;
pub mod schema;
pub mod selection;
pub mod service;
pub mod types;

pub use depth::{OperationShape, DEFAULT_MAX_DEPTH, MAX_SELECTED_FIELDS};
pub use loaders::Loaders;
pub use schema::{build_schema, MurmurSchema, SchemaBuilder};
pub use selection::{QueryError, SelectionNode};
pub use service::GraphQLService;
