//! Query depth and size limiting
//!
//! Depth is counted with fragments expanded in place: a leaf field is 0 and
//! a field with a sub-selection is one more than its deepest child. The
//! depth of an operation is the depth of its deepest root field, so
//! `{ users { id } }` has depth 1. Introspection fields (`__schema`,
//! `__typename`, ...) add no depth.
//!
//! The expanded tree is never built. Each fragment is measured once and the
//! result reused at every spread, so fragments spreading each other many
//! times cost no more than their text.

use std::collections::{HashMap, HashSet};

use async_graphql::parser::types::{ExecutableDocument, FragmentDefinition, Selection, SelectionSet};

use super::selection::{is_introspection, operations, QueryError};

/// Default maximum query depth
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Maximum number of fields one operation may select once fragments are
/// expanded
pub const MAX_SELECTED_FIELDS: usize = 10_000;

/// Depth and size of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationShape {
    /// Operation name, `None` for an anonymous operation
    pub operation: Option<String>,
    pub depth: usize,
    /// Selected fields after fragment expansion, saturating at `usize::MAX`
    pub fields: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Measure {
    /// Depth of a field whose sub-selection this is
    depth: usize,
    fields: usize,
}

impl Measure {
    fn merge(&mut self, other: Measure) {
        self.depth = self.depth.max(other.depth);
        self.fields = self.fields.saturating_add(other.fields);
    }
}

struct Measurer<'a> {
    fragments: HashMap<&'a str, &'a FragmentDefinition>,
    measured: HashMap<&'a str, Measure>,
    /// Fragments currently being measured, for cycle detection
    active: HashSet<&'a str>,
}

impl<'a> Measurer<'a> {
    fn selection_set(&mut self, set: &'a SelectionSet) -> Result<Measure, QueryError> {
        let mut total = Measure::default();
        for item in &set.items {
            let measure = match &item.node {
                Selection::Field(field) => {
                    let children = self.selection_set(&field.node.selection_set.node)?;
                    let depth = if is_introspection(field.node.name.node.as_str()) {
                        0
                    } else {
                        children.depth + 1
                    };
                    Measure {
                        depth,
                        fields: children.fields.saturating_add(1),
                    }
                }
                Selection::InlineFragment(fragment) => {
                    self.selection_set(&fragment.node.selection_set.node)?
                }
                Selection::FragmentSpread(spread) => {
                    self.fragment(spread.node.fragment_name.node.as_str())?
                }
            };
            total.merge(measure);
        }
        Ok(total)
    }

    fn fragment(&mut self, name: &'a str) -> Result<Measure, QueryError> {
        if let Some(measure) = self.measured.get(name) {
            return Ok(*measure);
        }
        let fragment = *self
            .fragments
            .get(name)
            .ok_or_else(|| QueryError::UnknownFragment(name.to_string()))?;
        if !self.active.insert(name) {
            return Err(QueryError::FragmentCycle(name.to_string()));
        }
        let measure = self.selection_set(&fragment.selection_set.node);
        self.active.remove(name);

        let measure = measure?;
        self.measured.insert(name, measure);
        Ok(measure)
    }
}

/// Measure every operation in `document`
///
/// Fails on a spread of an unknown fragment or a fragment that spreads
/// itself, directly or through others.
pub fn measure_operations(
    document: &ExecutableDocument,
) -> Result<Vec<OperationShape>, QueryError> {
    let mut measurer = Measurer {
        fragments: document
            .fragments
            .iter()
            .map(|(name, fragment)| (name.as_str(), &fragment.node))
            .collect(),
        measured: HashMap::new(),
        active: HashSet::new(),
    };

    operations(document)
        .into_iter()
        .map(|(name, operation)| {
            let measure = measurer.selection_set(&operation.selection_set.node)?;
            Ok(OperationShape {
                operation: name.map(str::to_string),
                depth: measure.depth.saturating_sub(1),
                fields: measure.fields,
            })
        })
        .collect()
}

/// Reject the operations if any of them is deeper than `max_depth`
pub fn validate_depth(shapes: &[OperationShape], max_depth: usize) -> Result<(), QueryError> {
    for shape in shapes {
        if shape.depth > max_depth {
            tracing::warn!(
                operation = shape.operation.as_deref().unwrap_or("<anonymous>"),
                depth = shape.depth,
                max_depth,
                "Rejecting query that exceeds the depth limit"
            );
            return Err(QueryError::TooDeep {
                depth: shape.depth,
                max: max_depth,
            });
        }
    }
    Ok(())
}

/// Reject the operations if any of them selects more than `max_fields`
pub fn validate_size(shapes: &[OperationShape], max_fields: usize) -> Result<(), QueryError> {
    for shape in shapes {
        if shape.fields > max_fields {
            tracing::warn!(
                operation = shape.operation.as_deref().unwrap_or("<anonymous>"),
                fields = shape.fields,
                max_fields,
                "Rejecting query that selects too many fields"
            );
            return Err(QueryError::TooLarge { max: max_fields });
        }
    }
    Ok(())
}
