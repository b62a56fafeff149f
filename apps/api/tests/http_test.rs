//! HTTP-level tests for the router
//!
//! Drive the full axum app with `tower::ServiceExt::oneshot`.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_graphql_post_returns_data() {
    let dataset = Dataset::new();

    let (status, body) = post_graphql(app(&dataset.storage), "{ memberTypes { id } }").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "data": { "memberTypes": [{ "id": "BASIC" }, { "id": "BUSINESS" }] } })
    );
}

#[tokio::test]
async fn test_graphql_depth_rejection_shape() {
    let dataset = Dataset::new();

    let (status, body) = post_graphql(app(&dataset.storage), &nested_users_query(6)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        json!({ "message": "Query depth 6 exceeds the maximum allowed depth of 5" })
    );
}

#[tokio::test]
async fn test_graphql_field_errors_keep_partial_data() {
    let dataset = Dataset::new();
    dataset.storage.fail_on("find_profiles_by_user_ids");

    let (status, body) = post_graphql(app(&dataset.storage), "{ users { name profile { id } } }").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"][2], json!({ "name": "carol", "profile": null }));
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_playground_is_served() {
    let dataset = Dataset::new();

    let (status, body) = get(app(&dataset.storage), "/graphql/playground").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("GraphQL Playground"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let dataset = Dataset::new();

    let (status, body) = get(app(&dataset.storage), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = get(app(&dataset.storage), "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alive"));
}

#[tokio::test]
async fn test_readiness_follows_storage() {
    let dataset = Dataset::new();

    let (status, body) = get(app(&dataset.storage), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));

    dataset.storage.fail_on("ping");
    let (status, body) = get(app(&dataset.storage), "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("unhealthy"));
}
