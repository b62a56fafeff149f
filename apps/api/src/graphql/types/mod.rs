//! GraphQL object types
//!
//! Each type wraps its storage row and resolves relations through the
//! request's [`Loaders`](crate::graphql::loaders::Loaders). Every relation
//! field is nullable, so a failed load nulls that field only and leaves its
//! siblings intact.

mod member_type;
mod post;
mod profile;
mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::Post;
pub use profile::Profile;
pub use user::User;
