//! User model for Murmur
//!
//! Users author posts, own at most one profile and subscribe to other users.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Relation;

/// User record from the users table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Account balance
    pub balance: f64,

    /// Ids of the authors this user is subscribed to
    #[sqlx(skip)]
    #[serde(skip)]
    pub subscribed_to: Relation<Vec<Uuid>>,

    /// Ids of the users subscribed to this user
    #[sqlx(skip)]
    #[serde(skip)]
    pub subscribers: Relation<Vec<Uuid>>,
}

impl User {
    /// Create a user with no relations attached
    pub fn new(id: Uuid, name: impl Into<String>, balance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
            subscribed_to: Relation::NotRequested,
            subscribers: Relation::NotRequested,
        }
    }
}

/// Which subscription relations to fetch together with a set of users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserInclude {
    /// Attach `subscribed_to` (authors this user follows)
    pub subscribed_to: bool,
    /// Attach `subscribers` (users following this user)
    pub subscribers: bool,
}

impl UserInclude {
    /// Fetch both subscription relations
    pub fn all() -> Self {
        Self {
            subscribed_to: true,
            subscribers: true,
        }
    }

    /// Whether any relation has to be fetched
    pub fn any(&self) -> bool {
        self.subscribed_to || self.subscribers
    }
}

/// User creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub balance: f64,
}

/// Partial user update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub balance: Option<f64>,
}
