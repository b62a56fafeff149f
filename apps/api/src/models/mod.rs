//! Database models and types for Murmur
//!
//! This module contains SQLx models for:
//! - Users and their subscription edges
//! - Posts written by users
//! - Profiles and the membership tiers they belong to

pub mod member_type;
pub mod post;
pub mod profile;
pub mod relation;
pub mod subscription;
pub mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::{CreatePost, Post, UpdatePost};
pub use profile::{CreateProfile, Profile, UpdateProfile};
pub use relation::Relation;
pub use subscription::Subscription;
pub use user::{CreateUser, UpdateUser, User, UserInclude};
