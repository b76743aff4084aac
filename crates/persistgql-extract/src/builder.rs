//! Building the persisted query map from collected operation sources.

use indexmap::IndexSet;

use crate::document::{dedup_fragments, parse_document, print_document, separate_operations};
use crate::hash::IdStrategy;
use crate::map::{QueryId, QueryMap};
use crate::typename::add_typename;
use crate::Result;

/// Builds a [`QueryMap`] from named operation texts and a raw source blob.
///
/// The build is a pure function of its input sequence: the same texts in the
/// same order always produce the same map, byte for byte.
#[derive(Debug, Clone, Default)]
pub struct QueryMapBuilder {
    add_typename: bool,
    ids: IdStrategy,
}

impl QueryMapBuilder {
    /// Builder with sequential ids and no normalization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `__typename` injection into every collected operation.
    pub fn with_add_typename(mut self, add_typename: bool) -> Self {
        self.add_typename = add_typename;
        self
    }

    /// Choose how identifiers are assigned.
    pub fn with_id_strategy(mut self, ids: IdStrategy) -> Self {
        self.ids = ids;
        self
    }

    /// Build the map.
    ///
    /// `named_operations` come first (module enumeration order), then the
    /// operations split out of `raw_blob`. Exact text equality after
    /// canonicalization is the identity; ids follow first appearance.
    pub fn build(&self, named_operations: &[String], raw_blob: &str) -> Result<QueryMap> {
        let mut texts: Vec<String> = named_operations.to_vec();

        if !raw_blob.is_empty() {
            let mut blob_document = parse_document(raw_blob)?;
            dedup_fragments(&mut blob_document);

            // Map union across the per-operation splits: a text produced
            // twice by the blob path contributes one entry.
            let mut blob_texts: IndexSet<String> = IndexSet::new();
            for sub_document in separate_operations(&blob_document) {
                blob_texts.insert(print_document(&sub_document));
            }
            texts.extend(blob_texts);
        }

        if texts.is_empty() {
            return Ok(QueryMap::new());
        }

        // One combined parse canonicalizes every collected text through the
        // same printer, whichever extraction path produced it.
        let mut combined = parse_document(&texts.join("\n"))?;
        if self.add_typename {
            add_typename(&mut combined);
        }

        let mut map = QueryMap::new();
        for sub_document in separate_operations(&combined) {
            let text = print_document(&sub_document);
            if map.contains(&text) {
                continue;
            }
            let id = match &self.ids {
                IdStrategy::Sequential => QueryId::Index(map.len() as u32 + 1),
                IdStrategy::Hashed(algorithm) => QueryId::Hash(algorithm.digest_hex(&text)),
            };
            map.insert(text, id);
        }

        tracing::debug!(operations = map.len(), "built persisted query map");
        Ok(map)
    }
}
