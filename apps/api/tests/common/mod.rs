//! Common test utilities for API integration tests
//!
//! This module provides shared test infrastructure for integration tests:
//! a seeded in-memory dataset and helpers for running GraphQL queries.

#![allow(unused_imports)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
