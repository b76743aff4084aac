//! `__typename` normalization.
//!
//! Injects a `__typename` field into every selection set except the root
//! selection set of an operation definition, matching the transform GraphQL
//! clients apply before sending operations. Applying it during extraction
//! makes both sides agree on the canonical text, so lookups by text hit.

use graphql_parser::Pos;

use crate::ast::{Definition, Document, Field, OperationDefinition, Selection, SelectionSet};
use crate::document::parse_document;
use crate::Result;

const TYPENAME_FIELD: &str = "__typename";

/// Inject `__typename` into every eligible selection set of every definition.
///
/// Idempotent: selection sets already selecting an un-aliased `__typename`
/// are left alone, so collector-side and builder-side passes compose.
pub fn add_typename(document: &mut Document) {
    for definition in &mut document.definitions {
        match definition {
            Definition::Operation(operation) => {
                let root = match operation {
                    OperationDefinition::SelectionSet(selection_set) => selection_set,
                    OperationDefinition::Query(query) => &mut query.selection_set,
                    OperationDefinition::Mutation(mutation) => &mut mutation.selection_set,
                    OperationDefinition::Subscription(subscription) => &mut subscription.selection_set,
                };
                inject(root, true);
            }
            Definition::Fragment(fragment) => inject(&mut fragment.selection_set, false),
        }
    }
}

/// Parse one operation source, inject `__typename`, print it back.
pub fn normalize_text(source: &str) -> Result<String> {
    let mut document = parse_document(source)?;
    add_typename(&mut document);
    Ok(document.to_string())
}

fn inject(selection_set: &mut SelectionSet, is_operation_root: bool) {
    for selection in &mut selection_set.items {
        match selection {
            Selection::Field(field) if !field.selection_set.items.is_empty() => {
                inject(&mut field.selection_set, false);
            }
            Selection::InlineFragment(inline) => inject(&mut inline.selection_set, false),
            _ => {}
        }
    }

    if !is_operation_root && !selects_typename(selection_set) {
        selection_set.items.push(typename_field());
    }
}

fn selects_typename(selection_set: &SelectionSet) -> bool {
    selection_set.items.iter().any(|selection| {
        matches!(selection, Selection::Field(field)
            if field.name == TYPENAME_FIELD && field.alias.is_none())
    })
}

fn typename_field() -> Selection {
    let zero = Pos { line: 0, column: 0 };
    Selection::Field(Field {
        position: zero,
        alias: None,
        name: TYPENAME_FIELD.to_string(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (zero, zero),
            items: Vec::new(),
        },
    })
}
