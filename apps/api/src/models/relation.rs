//! Lazily attached relations on loaded entities
//!
//! A parent row can carry related data that was fetched alongside it (an
//! eager join) or leave it to be loaded later through a loader. `Relation`
//! makes that state explicit so resolvers can dispatch on it instead of
//! checking whether an optional field happens to be populated.

use std::sync::Arc;

/// Fetch state of a relation attached to a parent entity
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Relation<T> {
    /// The relation was not part of the query that produced the parent
    #[default]
    NotRequested,
    /// The relation was requested but has not been attached yet
    Pending,
    /// The related data was fetched together with the parent
    Resolved(T),
    /// Fetching the relation failed; the parent row itself is still valid
    Failed(Arc<str>),
}

impl<T> Relation<T> {
    /// Build a failed relation from any displayable error
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed(Arc::from(error.to_string()))
    }
}
