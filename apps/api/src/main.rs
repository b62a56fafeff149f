use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur_api::config::{Config, StorageBackend};
use murmur_api::graphql::{GraphQLService, SchemaBuilder};
use murmur_api::routes::app_router;
use murmur_api::storage::{MemoryStorage, PostgresStorage, SharedStorage};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    let is_production = config.is_production();

    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if is_production => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

/// Connect to the configured storage backend, running migrations for postgres
async fn connect_storage(config: &Config) -> anyhow::Result<SharedStorage> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let database = config.database();
            tracing::info!("Connecting to database...");

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(std::time::Duration::from_secs(
                    database.connect_timeout_secs,
                ))
                .connect(&database.url)
                .await?;

            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed successfully");

            Ok(Arc::new(PostgresStorage::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, all data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before the filter reads RUST_LOG
    let dotenv_loaded = murmur_shared_config::load_dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv_loaded {
        tracing::debug!("Loaded environment from .env");
    }

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        port = config.port,
        environment = %config.environment(),
        storage = %config.storage_backend,
        max_query_depth = config.max_query_depth,
        "Starting Murmur API server"
    );

    let storage = connect_storage(&config).await?;

    let mut schema = SchemaBuilder::new(storage.clone());
    if !config.graphql_introspection {
        schema = schema.disable_introspection();
    }
    let service = GraphQLService::with_schema(schema.build(), storage.clone(), config.max_query_depth);
    tracing::info!("GraphQL schema built");

    let app = app_router(service, storage)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
