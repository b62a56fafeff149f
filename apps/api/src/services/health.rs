//! Health check service for the storage backend

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::storage::SharedStorage;

/// Status of an individual service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy and responding
    Healthy,
    /// Service is unhealthy or unreachable
    Unhealthy,
}

/// Result of a single service health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    /// Name of the service
    pub name: &'static str,
    /// Current status
    pub status: ServiceStatus,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    /// Create a healthy service result
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: response_time.as_millis() as u64,
            error: None,
        }
    }

    /// Create an unhealthy service result
    pub fn unhealthy(name: &'static str, error: impl Into<String>, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            error: Some(error.into()),
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if all services are healthy)
    pub status: ServiceStatus,
    /// Individual service health results
    pub services: Vec<ServiceHealth>,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    /// Create a new health check response from individual service results
    pub fn new(services: Vec<ServiceHealth>) -> Self {
        let status = if services.iter().all(|s| s.status == ServiceStatus::Healthy) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Check if overall health is good
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Checks the dependencies the API cannot serve requests without
pub struct HealthService {
    storage: SharedStorage,
}

impl HealthService {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Ping the storage backend
    pub async fn check_storage(&self) -> ServiceHealth {
        let start = Instant::now();
        match self.storage.ping().await {
            Ok(()) => ServiceHealth::healthy("storage", start.elapsed()),
            Err(e) => {
                tracing::warn!(error = %e, "Storage health check failed");
                ServiceHealth::unhealthy("storage", e.to_string(), start.elapsed())
            }
        }
    }

    /// Run all health checks
    pub async fn check_all(&self) -> HealthCheckResponse {
        HealthCheckResponse::new(vec![self.check_storage().await])
    }
}
