//! Document-level operations: parsing, fragment deduplication, and splitting
//! a multi-operation document into one sub-document per operation.

use std::collections::{HashMap, HashSet};

use crate::ast::{Definition, Document, FragmentDefinition, OperationDefinition, Selection, SelectionSet};
use crate::Result;

/// Parse GraphQL source into an owned executable document.
pub fn parse_document(source: &str) -> Result<Document> {
    Ok(graphql_parser::query::parse_query::<String>(source)?.into_static())
}

/// Print a document back to canonical text.
///
/// This is the identity transform for formatting: parse-then-print output of
/// the standard printer defines what "canonical text" means for map keys.
pub fn print_document(document: &Document) -> String {
    document.to_string()
}

/// Drop duplicate fragment definitions, keeping the last one per name.
///
/// A single forward pass records each fragment name's last index; a filter
/// then keeps only fragment definitions sitting at their last-seen index, so
/// when a name is defined more than once the definition appearing last in
/// source order wins and all earlier ones are discarded.
pub fn dedup_fragments(document: &mut Document) {
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    for (index, definition) in document.definitions.iter().enumerate() {
        if let Definition::Fragment(fragment) = definition {
            last_seen.insert(fragment.name.clone(), index);
        }
    }

    let definitions = std::mem::take(&mut document.definitions);
    document.definitions = definitions
        .into_iter()
        .enumerate()
        .filter(|(index, definition)| match definition {
            Definition::Fragment(fragment) => last_seen[&fragment.name] == *index,
            _ => true,
        })
        .map(|(_, definition)| definition)
        .collect();
}

/// Split a document into one sub-document per operation definition.
///
/// Each sub-document contains the operation plus every fragment it
/// transitively references, preserving the original definition order.
/// Fragments nothing references are dropped; anonymous operations are split
/// like named ones.
pub fn separate_operations(document: &Document) -> Vec<Document> {
    let fragments: HashMap<&str, &FragmentDefinition> = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
            _ => None,
        })
        .collect();

    let mut separated = Vec::new();
    for (index, definition) in document.definitions.iter().enumerate() {
        let Definition::Operation(operation) = definition else {
            continue;
        };

        let needed = required_fragments(operation_selection_set(operation), &fragments);
        let definitions = document
            .definitions
            .iter()
            .enumerate()
            .filter_map(|(other, candidate)| {
                if other == index {
                    return Some(candidate.clone());
                }
                match candidate {
                    Definition::Fragment(fragment) if needed.contains(fragment.name.as_str()) => {
                        Some(candidate.clone())
                    }
                    _ => None,
                }
            })
            .collect();

        separated.push(Document { definitions });
    }
    separated
}

/// The root selection set of an operation definition.
pub(crate) fn operation_selection_set(operation: &OperationDefinition) -> &SelectionSet {
    match operation {
        OperationDefinition::SelectionSet(selection_set) => selection_set,
        OperationDefinition::Query(query) => &query.selection_set,
        OperationDefinition::Mutation(mutation) => &mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &subscription.selection_set,
    }
}

/// Fragment names transitively reachable from `root` through spreads.
fn required_fragments(
    root: &SelectionSet,
    fragments: &HashMap<&str, &FragmentDefinition>,
) -> HashSet<String> {
    let mut needed = HashSet::new();
    let mut pending = Vec::new();
    collect_spreads(root, &mut pending);

    while let Some(name) = pending.pop() {
        if !needed.insert(name.clone()) {
            continue;
        }
        if let Some(fragment) = fragments.get(name.as_str()) {
            collect_spreads(&fragment.selection_set, &mut pending);
        }
    }
    needed
}

fn collect_spreads(selection_set: &SelectionSet, spreads: &mut Vec<String>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => collect_spreads(&field.selection_set, spreads),
            Selection::FragmentSpread(spread) => spreads.push(spread.fragment_name.clone()),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, spreads),
        }
    }
}
