//! API server configuration

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use murmur_shared_config::{parse_env, CommonConfig, DatabaseConfig, Environment};

use crate::graphql::DEFAULT_MAX_DEPTH;

/// Which storage backend serves the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// PostgreSQL through sqlx
    #[default]
    Postgres,
    /// In-process tables, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown storage backend '{}' (expected postgres or memory)", other),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Maximum nesting depth of GraphQL queries (default: 5)
    pub max_query_depth: usize,

    /// Storage backend (default: postgres)
    pub storage_backend: StorageBackend,

    /// Whether introspection queries are served (default: off in production)
    pub graphql_introspection: bool,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode, this function requires:
    /// - `DATABASE_URL`: Must be explicitly set (no insecure defaults)
    /// - `STORAGE_BACKEND`: Must be `postgres` if set
    ///
    /// In development/staging mode, sensible defaults are used for convenience.
    pub fn from_env() -> Result<Self> {
        // Determine environment first to know if we need strict validation
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();
        let is_production = environment.is_production();

        let storage_backend = Self::load_storage_backend(is_production)?;

        // Validate DATABASE_URL is explicitly set in production
        if is_production {
            Self::validate_database_url()?;
        }

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            max_query_depth: Self::load_max_query_depth()?,

            storage_backend,

            graphql_introspection: parse_env("GRAPHQL_INTROSPECTION", !is_production)?,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    /// Load and validate STORAGE_BACKEND
    ///
    /// The in-memory backend loses all data on restart, so production
    /// refuses it.
    fn load_storage_backend(is_production: bool) -> Result<StorageBackend> {
        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => StorageBackend::default(),
        };
        if is_production && backend != StorageBackend::Postgres {
            bail!(
                "STORAGE_BACKEND={} is not allowed in production. \
                 Use the postgres backend.",
                backend
            );
        }
        Ok(backend)
    }

    /// Load and validate MAX_QUERY_DEPTH
    fn load_max_query_depth() -> Result<usize> {
        let depth: usize = parse_env("MAX_QUERY_DEPTH", DEFAULT_MAX_DEPTH)?;
        if depth == 0 {
            bail!("MAX_QUERY_DEPTH must be at least 1");
        }
        Ok(depth)
    }

    /// Validate that DATABASE_URL is explicitly set in production
    fn validate_database_url() -> Result<()> {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production. \
                     Please set your PostgreSQL connection string."
                );
            }
        }
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
