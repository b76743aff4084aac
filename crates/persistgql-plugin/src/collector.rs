//! Walks one build's compiled modules and gathers their GraphQL content.

use persistgql_extract::normalize_text;

use crate::host::{GraphqlAttribute, ModuleRecord};

/// Everything the collector gathered from one build, in module order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedOperations {
    /// Pre-extracted operation texts, in order of discovery.
    pub operations: Vec<String>,
    /// Concatenation of all raw GraphQL file content across modules.
    pub raw_blob: String,
}

impl CollectedOperations {
    /// Whether nothing was gathered at all.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.raw_blob.is_empty()
    }
}

/// Partitions each module's contribution into named operation texts or raw
/// source, preserving the host's module enumeration order throughout —
/// that order decides identifier assignment later.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationCollector {
    add_typename: bool,
}

impl OperationCollector {
    /// Collector without normalization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize named operation texts with `__typename` injection while
    /// collecting. Raw source is normalized later, during map building, so
    /// both paths converge on the same canonical text.
    pub fn with_add_typename(mut self, add_typename: bool) -> Self {
        self.add_typename = add_typename;
        self
    }

    /// Walk `modules` in order. Modules carrying neither attribute are
    /// skipped; malformed named operations abort collection.
    pub fn collect(&self, modules: &[ModuleRecord]) -> crate::Result<CollectedOperations> {
        let mut collected = CollectedOperations::default();
        for module in modules {
            match &module.graphql {
                Some(GraphqlAttribute::NamedOperations(operations)) => {
                    for text in operations.values() {
                        let text = if self.add_typename {
                            normalize_text(text).map_err(crate::Error::Extract)?
                        } else {
                            text.clone()
                        };
                        collected.operations.push(text);
                    }
                }
                Some(GraphqlAttribute::RawSource(source)) => {
                    collected.raw_blob.push_str(source);
                }
                None => {}
            }
        }
        tracing::debug!(
            operations = collected.operations.len(),
            blob_bytes = collected.raw_blob.len(),
            "collected GraphQL operations"
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_named_operations_and_raw_source() {
        let modules = [
            ModuleRecord::new("entry.js").with_named_operations([(
                "onCounterUpdated",
                "subscription onCounterUpdated { counterUpdated { amount } }",
            )]),
            ModuleRecord::new("plain.js"),
            ModuleRecord::new("example.graphql")
                .with_raw_source("query getCount { count { amount } }\n"),
        ];

        let collected = OperationCollector::new().collect(&modules).unwrap();
        assert_eq!(
            collected.operations,
            ["subscription onCounterUpdated { counterUpdated { amount } }"]
        );
        assert_eq!(collected.raw_blob, "query getCount { count { amount } }\n");
    }

    #[test]
    fn raw_sources_concatenate_in_module_order() {
        let modules = [
            ModuleRecord::new("a.graphql").with_raw_source("query a { x }\n"),
            ModuleRecord::new("b.graphql").with_raw_source("query b { y }\n"),
        ];
        let collected = OperationCollector::new().collect(&modules).unwrap();
        assert_eq!(collected.raw_blob, "query a { x }\nquery b { y }\n");
    }

    #[test]
    fn add_typename_normalizes_named_operations() {
        let modules = [ModuleRecord::new("entry.js")
            .with_named_operations([("getCount", "query getCount { count { amount } }")])];
        let collected = OperationCollector::new()
            .with_add_typename(true)
            .collect(&modules)
            .unwrap();
        assert_eq!(
            collected.operations,
            ["query getCount {\n  count {\n    amount\n    __typename\n  }\n}\n"]
        );
    }

    #[test]
    fn modules_without_graphql_yield_nothing() {
        let collected = OperationCollector::new()
            .collect(&[ModuleRecord::new("a.js"), ModuleRecord::new("b.js")])
            .unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn malformed_named_operation_aborts_collection() {
        let modules =
            [ModuleRecord::new("entry.js").with_named_operations([("broken", "query {")])];
        let result = OperationCollector::new()
            .with_add_typename(true)
            .collect(&modules);
        assert!(result.is_err());
    }
}
