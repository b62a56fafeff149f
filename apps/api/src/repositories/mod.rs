//! Database repository layer for Murmur
//!
//! Each repository owns the SQL for one table. The `PostgresStorage`
//! collaborator composes them; nothing else talks to the pool directly.

pub mod member_type;
pub mod post;
pub mod profile;
pub mod subscription;
pub mod user;
pub mod utils;

pub use member_type::MemberTypeRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
