//! GraphQL HTTP route handlers
//!
//! - `POST /graphql` - Execute a query; body `{query, variables, operationName}`
//! - `GET /graphql/playground` - GraphQL Playground UI
//!
//! Responses always carry `data` (null when the query was rejected) and an
//! `errors` list of `{message}` objects when anything failed.

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::GraphQLRequest;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::ApiResult;
use crate::graphql::GraphQLService;

/// One entry of the `errors` list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// GraphQL response body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLBody {
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorMessage>,
}

impl GraphQLBody {
    /// Convert an executed response into the wire shape
    pub fn from_response(response: async_graphql::Response) -> ApiResult<Self> {
        let errors = response
            .errors
            .into_iter()
            .map(|e| ErrorMessage { message: e.message })
            .collect();
        Ok(Self {
            data: response.data.into_json()?,
            errors,
        })
    }
}

/// Create the GraphQL router
pub fn graphql_router(service: GraphQLService) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .with_state(service)
}

/// Execute a GraphQL request
async fn graphql_handler(
    State(service): State<GraphQLService>,
    request: GraphQLRequest,
) -> ApiResult<Json<GraphQLBody>> {
    let response = service.execute(request.into_inner()).await;
    if !response.errors.is_empty() {
        tracing::debug!(errors = response.errors.len(), "GraphQL request finished with errors");
    }
    Ok(Json(GraphQLBody::from_response(response)?))
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_graphql::{ServerError, Value};

    #[test]
    fn test_body_omits_empty_errors() {
        let body = GraphQLBody::from_response(async_graphql::Response::new(Value::Null)).unwrap();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json, serde_json::json!({ "data": null }));
    }

    #[test]
    fn test_body_keeps_only_error_messages() {
        let response =
            async_graphql::Response::from_errors(vec![ServerError::new("too deep", None)]);

        let json = serde_json::to_value(GraphQLBody::from_response(response).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "data": null, "errors": [{ "message": "too deep" }] })
        );
    }
}
