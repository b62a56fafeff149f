//! Business logic services for the Murmur API

pub mod health;

pub use health::{HealthCheckResponse, HealthService, ServiceHealth, ServiceStatus};
