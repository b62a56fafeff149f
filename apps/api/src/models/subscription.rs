//! Subscription edge model for Murmur

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the subscribers_on_authors table: `subscriber_id` follows `author_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize)]
pub struct Subscription {
    pub subscriber_id: Uuid,
    pub author_id: Uuid,
}
