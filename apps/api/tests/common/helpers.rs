//! Test helper functions for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use murmur_api::graphql::{GraphQLService, DEFAULT_MAX_DEPTH};
use murmur_api::routes::app_router;
use murmur_api::storage::MemoryStorage;

/// Service with the default depth limit over `storage`
pub fn service(storage: &Arc<MemoryStorage>) -> GraphQLService {
    GraphQLService::new(storage.clone(), DEFAULT_MAX_DEPTH)
}

/// Outcome of one executed query, as JSON
pub struct Outcome {
    pub data: Value,
    pub errors: Vec<String>,
}

/// Execute `query` and convert the response to JSON
pub async fn run(service: &GraphQLService, query: &str) -> Outcome {
    let response = service.execute(query).await;
    Outcome {
        errors: response.errors.iter().map(|e| e.message.clone()).collect(),
        data: response.data.into_json().unwrap(),
    }
}

/// Application router over `storage`
pub fn app(storage: &Arc<MemoryStorage>) -> Router {
    app_router(service(storage), storage.clone())
}

/// POST a GraphQL query to the router
pub async fn post_graphql(app: Router, query: &str) -> (StatusCode, Value) {
    let body = serde_json::json!({ "query": query }).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/graphql")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// GET a path from the router, returning status and body text
pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
