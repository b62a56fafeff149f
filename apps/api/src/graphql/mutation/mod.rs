//! GraphQL mutations for Murmur
//!
//! Every mutation is a single storage write. A failed write is reported as
//! an error on that mutation field; the field itself resolves to null.

mod post;
mod profile;
mod user;

pub use post::{ChangePostInput, CreatePostInput, PostMutation};
pub use profile::{ChangeProfileInput, CreateProfileInput, ProfileMutation};
pub use user::{ChangeUserInput, CreateUserInput, UserMutation};

use async_graphql::MergedObject;

use crate::error::ApiError;

/// Maximum length of user names and post titles
const MAX_NAME_LENGTH: usize = 255;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(UserMutation, PostMutation, ProfileMutation);

/// Reject empty or overlong names
fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{field} cannot be empty")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::ValidationError(format!(
            "{field} cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
