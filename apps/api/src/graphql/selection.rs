//! Field selection trees and query documents
//!
//! A [`SelectionNode`] is one requested field together with its
//! sub-selection, built from the field a resolver is running in (for
//! planning eager fetches). The document helpers here find the operations
//! of a parsed query and the response keys of their root fields.

use std::collections::HashSet;

use async_graphql::parser::types::{
    DocumentOperations, ExecutableDocument, OperationDefinition, Selection, SelectionSet,
};
use async_graphql::{Name, SelectionField};

/// Errors raised while reading a query document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unknown fragment \"{0}\"")]
    UnknownFragment(String),

    #[error("Cannot spread fragment \"{0}\" within itself")]
    FragmentCycle(String),

    #[error("Query depth {depth} exceeds the maximum allowed depth of {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("Query selects more than {max} fields")]
    TooLarge { max: usize },
}

/// One requested field and the fields requested below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionNode {
    pub name: String,
    pub children: Vec<SelectionNode>,
}

impl SelectionNode {
    pub fn new(name: impl Into<String>, children: Vec<SelectionNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// A field without sub-selection
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Whether a direct child named `name` was requested
    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    /// Build the tree for the field a resolver is currently executing
    ///
    /// Fragments are expanded in place by the executor, so the children are
    /// exactly the fields the client asked for below it.
    pub fn from_field(field: SelectionField<'_>) -> Self {
        Self::new(
            field.name(),
            field.selection_set().map(Self::from_field).collect(),
        )
    }
}

/// Whether a field name belongs to the introspection system
pub fn is_introspection(name: &str) -> bool {
    name.starts_with("__")
}

/// Parse query text into a document
pub fn parse(query: &str) -> Result<ExecutableDocument, QueryError> {
    async_graphql::parser::parse_query(query).map_err(|e| QueryError::Syntax(e.to_string()))
}

/// Every operation in `document` with its name, `None` when anonymous
pub fn operations(document: &ExecutableDocument) -> Vec<(Option<&str>, &OperationDefinition)> {
    match &document.operations {
        DocumentOperations::Single(operation) => vec![(None, &operation.node)],
        DocumentOperations::Multiple(operations) => operations
            .iter()
            .map(|(name, operation)| (Some(name.as_str()), &operation.node))
            .collect(),
    }
}

/// The operation a request with `operation_name` executes
///
/// `None` when the name matches nothing, or when no name was given and the
/// document holds several operations.
pub fn find_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Option<&'a OperationDefinition> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), _) => Some(&operation.node),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, operation)| &operation.node),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => {
            operations.values().next().map(|operation| &operation.node)
        }
        _ => None,
    }
}

/// Response keys of an operation's root fields, in document order
///
/// Fragments at the root are expanded; each named fragment is read once.
pub fn root_response_keys(
    document: &ExecutableDocument,
    operation: &OperationDefinition,
) -> Vec<Name> {
    let mut keys = Vec::new();
    let mut seen_fragments = HashSet::new();
    collect_response_keys(
        document,
        &operation.selection_set.node,
        &mut seen_fragments,
        &mut keys,
    );
    keys
}

fn collect_response_keys<'a>(
    document: &'a ExecutableDocument,
    set: &'a SelectionSet,
    seen_fragments: &mut HashSet<&'a str>,
    keys: &mut Vec<Name>,
) {
    for item in &set.items {
        match &item.node {
            Selection::Field(field) => {
                let key = &field.node.response_key().node;
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
            Selection::InlineFragment(fragment) => {
                collect_response_keys(
                    document,
                    &fragment.node.selection_set.node,
                    seen_fragments,
                    keys,
                );
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !seen_fragments.insert(name) {
                    continue;
                }
                let fragment = document
                    .fragments
                    .iter()
                    .find(|(key, _)| key.as_str() == name)
                    .map(|(_, fragment)| &fragment.node);
                if let Some(fragment) = fragment {
                    collect_response_keys(
                        document,
                        &fragment.selection_set.node,
                        seen_fragments,
                        keys,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    fn keys(query: &str, operation_name: Option<&str>) -> Option<Vec<String>> {
        let document = parse(query).unwrap();
        let operation = find_operation(&document, operation_name)?;
        Some(
            root_response_keys(&document, operation)
                .into_iter()
                .map(|key| key.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_syntax_error() {
        assert_matches!(parse("{ users { id }"), Err(QueryError::Syntax(_)));
    }

    #[test]
    fn test_one_entry_per_operation() {
        let document = parse("query A { users { id } } query B { posts { id } }").unwrap();

        let mut names: Vec<Option<&str>> = operations(&document)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();

        assert_eq!(names, vec![Some("A"), Some("B")]);
    }

    #[test]
    fn test_root_keys_use_aliases() {
        let query = r#"{ first: user(id: "x") { id } posts { id } first: user(id: "x") { name } }"#;

        assert_eq!(
            keys(query, None),
            Some(vec!["first".to_string(), "posts".to_string()])
        );
    }

    #[test]
    fn test_root_keys_expand_fragments() {
        let query = r#"
            mutation M { ...Writes ... on Mutation { deletePost(id: "x") } }
            fragment Writes on Mutation { deleteUser(id: "x") ...Writes2 ...Writes2 }
            fragment Writes2 on Mutation { deleteProfile(id: "x") }
        "#;

        assert_eq!(
            keys(query, Some("M")),
            Some(vec![
                "deleteUser".to_string(),
                "deleteProfile".to_string(),
                "deletePost".to_string()
            ])
        );
    }

    #[test]
    fn test_find_operation_by_name() {
        let query = "query A { users { id } } query B { posts { id } }";

        assert_eq!(keys(query, Some("B")), Some(vec!["posts".to_string()]));
        assert_eq!(keys(query, Some("C")), None);
        assert_eq!(keys(query, None), None);
    }

    #[test]
    fn test_introspection_fields() {
        assert!(is_introspection("__typename"));
        assert!(!is_introspection("users"));
    }
}
