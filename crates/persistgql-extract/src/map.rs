//! The persisted query map: canonical operation text mapped to a stable id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier assigned to one canonical operation text.
///
/// Sequential ids start at 1 and follow order of first appearance; hashed
/// ids are lowercase hex digests (64 characters for sha256, 128 for sha512).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryId {
    /// Sequential identifier (order of first appearance, starting at 1).
    Index(u32),
    /// Lowercase hex digest of the operation text.
    Hash(String),
}

/// Mapping from canonical operation text to [`QueryId`].
///
/// Key order is insertion order and survives serialization, so the
/// serialized artifact is byte-stable for a fixed input sequence. This is the
/// one persisted, versioned entity in the system: once published for a build
/// it is never mutated, only replaced wholesale by a later computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryMap {
    entries: IndexMap<String, QueryId>,
}

impl QueryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct operations in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no operations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the id assigned to an exact operation text.
    pub fn get(&self, operation_text: &str) -> Option<&QueryId> {
        self.entries.get(operation_text)
    }

    /// Whether an exact operation text is already mapped.
    pub fn contains(&self, operation_text: &str) -> bool {
        self.entries.contains_key(operation_text)
    }

    /// Insert an operation text with its id. Returns `false` (leaving the
    /// existing entry untouched) when the text is already mapped.
    pub fn insert(&mut self, operation_text: String, id: QueryId) -> bool {
        if self.entries.contains_key(&operation_text) {
            return false;
        }
        self.entries.insert(operation_text, id);
        true
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryId)> {
        self.entries.iter()
    }

    /// Serialize to the compact persisted artifact form, e.g.
    /// `{"query getCount {\n  count {\n    amount\n  }\n}\n":1}`.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
