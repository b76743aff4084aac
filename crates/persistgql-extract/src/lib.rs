//! # persistgql-extract
//!
//! GraphQL operation extraction and persisted query map building.
//!
//! This crate turns GraphQL operation sources — pre-extracted named
//! operations and raw `.graphql` file content — into a deduplicated map from
//! canonical operation text to a stable identifier (a sequential integer or a
//! content hash). It knows nothing about any build system; the companion
//! `persistgql-plugin` crate wires it into build lifecycles.
//!
//! ## Quick Start
//!
//! ```
//! use persistgql_extract::QueryMapBuilder;
//!
//! # fn main() -> persistgql_extract::Result<()> {
//! let builder = QueryMapBuilder::new();
//! let map = builder.build(
//!     &["subscription onCounterUpdated { counterUpdated { amount } }".to_string()],
//!     "query getCount { count { amount } }",
//! )?;
//! assert_eq!(map.len(), 2);
//! # Ok(()) }
//! ```

pub mod builder;
pub mod document;
pub mod hash;
pub mod map;
pub mod typename;

pub use builder::QueryMapBuilder;
pub use document::{dedup_fragments, parse_document, print_document, separate_operations};
pub use hash::{HashingAlgorithm, IdStrategy};
pub use map::{QueryId, QueryMap};
pub use typename::{add_typename, normalize_text};

/// AST aliases pinned to the owned text type used throughout this crate.
pub(crate) mod ast {
    pub type Definition = graphql_parser::query::Definition<'static, String>;
    pub type Document = graphql_parser::query::Document<'static, String>;
    pub type Field = graphql_parser::query::Field<'static, String>;
    pub type FragmentDefinition = graphql_parser::query::FragmentDefinition<'static, String>;
    pub type OperationDefinition = graphql_parser::query::OperationDefinition<'static, String>;
    pub type Selection = graphql_parser::query::Selection<'static, String>;
    pub type SelectionSet = graphql_parser::query::SelectionSet<'static, String>;
}

/// Error types for extraction and map building.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed GraphQL source. Fatal: no partial map is produced.
    #[error("failed to parse GraphQL source: {0}")]
    Parse(#[from] graphql_parser::query::ParseError),

    /// Query map could not be serialized.
    #[error("failed to serialize query map: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
