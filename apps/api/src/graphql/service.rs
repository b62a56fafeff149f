//! GraphQL request execution
//!
//! Every request goes through the same gate before the schema sees it:
//! the document is parsed, each operation is measured against the depth
//! and size limits, and only then is a fresh set of loaders attached and
//! the query executed. A rejected query never touches storage.

use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{Request, Response, ServerError, Value};

use crate::storage::SharedStorage;

use super::depth::{measure_operations, validate_depth, validate_size, MAX_SELECTED_FIELDS};
use super::loaders::Loaders;
use super::schema::{build_schema, MurmurSchema};
use super::selection::{find_operation, parse, root_response_keys, QueryError};

/// Executes GraphQL requests with per-request loaders
#[derive(Clone)]
pub struct GraphQLService {
    schema: MurmurSchema,
    storage: SharedStorage,
    max_depth: usize,
}

impl GraphQLService {
    /// Create a service with a schema built over `storage`
    pub fn new(storage: SharedStorage, max_depth: usize) -> Self {
        Self::with_schema(build_schema(storage.clone()), storage, max_depth)
    }

    /// Create a service around an already built schema
    pub fn with_schema(schema: MurmurSchema, storage: SharedStorage, max_depth: usize) -> Self {
        Self {
            schema,
            storage,
            max_depth,
        }
    }

    pub fn schema(&self) -> &MurmurSchema {
        &self.schema
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check the query text without executing it
    pub fn validate(&self, query: &str) -> Result<(), QueryError> {
        self.check(query).map(|_| ())
    }

    fn check(&self, query: &str) -> Result<ExecutableDocument, QueryError> {
        let document = parse(query)?;
        let shapes = measure_operations(&document)?;
        validate_depth(&shapes, self.max_depth)?;
        validate_size(&shapes, MAX_SELECTED_FIELDS)?;
        Ok(document)
    }

    /// Validate and execute one request
    ///
    /// Validation failures produce a response with `null` data and a
    /// single error. Once executed, `data` is an object even when every
    /// root field failed.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();

        let document = match self.check(&request.query) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(error = %error, "Query rejected before execution");
                return Response::from_errors(vec![ServerError::new(error.to_string(), None)]);
            }
        };
        let operation_name = request.operation_name.clone();

        let request = request.data(Loaders::new(self.storage.clone()));
        let response = self.schema.execute(request).await;
        restore_root_fields(response, &document, operation_name.as_deref())
    }
}

/// Give back a `data` object when all root fields failed
///
/// The executor answers `null` data when no root field produced a value.
/// Root fields are nullable, so each failed one is set to `null` under its
/// response key instead. Responses carrying an error that is not tied to a
/// field (request validation, unknown operation) are left alone.
fn restore_root_fields(
    mut response: Response,
    document: &ExecutableDocument,
    operation_name: Option<&str>,
) -> Response {
    let only_field_errors =
        !response.errors.is_empty() && response.errors.iter().all(|e| !e.path.is_empty());
    if response.data != Value::Null || !only_field_errors {
        return response;
    }

    if let Some(operation) = find_operation(document, operation_name) {
        response.data = Value::Object(
            root_response_keys(document, operation)
                .into_iter()
                .map(|key| (key, Value::Null))
                .collect(),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use assert_matches::assert_matches;

    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_rejected_query_has_null_data() {
        let service = GraphQLService::new(Arc::new(MemoryStorage::new()), 1);

        let response = service.execute("{ users { profile { id } } }").await;

        assert_eq!(response.data, async_graphql::Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("exceeds the maximum allowed depth"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_reported() {
        let service = GraphQLService::new(Arc::new(MemoryStorage::new()), 5);

        let response = service.execute("{ users { id ").await;

        assert_eq!(response.data, async_graphql::Value::Null);
        assert!(response.errors[0].message.starts_with("Syntax error"));
    }

    #[tokio::test]
    async fn test_doubling_fragments_are_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let service = GraphQLService::new(storage.clone(), 5);

        let mut query = String::from("{ users { ...F0 } }");
        for i in 0..30 {
            query.push_str(&format!(" fragment F{i} on User {{ ...F{n} ...F{n} }}", n = i + 1));
        }
        query.push_str(" fragment F30 on User { id }");

        let response = service.execute(query.as_str()).await;

        assert_eq!(response.data, async_graphql::Value::Null);
        assert_eq!(
            response.errors[0].message,
            format!("Query selects more than {MAX_SELECTED_FIELDS} fields")
        );
        assert!(storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_only_root_field_keeps_data_object() {
        let storage = Arc::new(MemoryStorage::new());
        storage.fail_on("find_member_types");
        let service = GraphQLService::new(storage, 5);

        let response = service.execute("{ types: memberTypes { id } }").await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({ "types": null })
        );
    }

    #[tokio::test]
    async fn test_request_errors_keep_null_data() {
        let service = GraphQLService::new(Arc::new(MemoryStorage::new()), 5);

        let response = service.execute("{ noSuchField }").await;

        assert_eq!(response.data, async_graphql::Value::Null);
        assert!(!response.errors.is_empty());
    }

    #[test]
    fn test_validate() {
        let service = GraphQLService::new(Arc::new(MemoryStorage::new()), 2);

        assert!(service.validate("{ users { profile { id } } }").is_ok());
        assert_matches!(
            service.validate("{ users { profile { memberType { id } } } }"),
            Err(QueryError::TooDeep { depth: 3, max: 2 })
        );
    }
}
