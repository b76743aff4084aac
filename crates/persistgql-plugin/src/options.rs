//! Plugin configuration.

use serde::{Deserialize, Serialize};

/// Options for [`PersistedQueriesPlugin`](crate::PersistedQueriesPlugin).
///
/// Field names serialize in camelCase so a config file carries the same
/// option bag the plugin has always accepted: `moduleName`, `filename`,
/// `addTypename`, `useHashes`, `hashingAlgorithm`. The provider link is not
/// configuration — it is established through
/// [`PersistedQueriesPlugin::listening_to`](crate::PersistedQueriesPlugin::listening_to).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Importable path under which the query map is published. Required.
    pub module_name: String,
    /// Artifact name to emit the serialized map under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Inject `__typename` into every collected operation.
    pub add_typename: bool,
    /// Assign content hashes instead of sequential integers.
    pub use_hashes: bool,
    /// Digest algorithm name when hashing: `"sha256"` or `"sha512"`.
    /// Unrecognized names fall back to sha512.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashing_algorithm: Option<String>,
}

impl PluginOptions {
    /// Options publishing the map under `module_name`, everything else off.
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    /// Also emit the serialized map as a named build artifact.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Toggle `__typename` injection.
    pub fn with_add_typename(mut self, add_typename: bool) -> Self {
        self.add_typename = add_typename;
        self
    }

    /// Toggle hashed identifiers.
    pub fn with_use_hashes(mut self, use_hashes: bool) -> Self {
        self.use_hashes = use_hashes;
        self
    }

    /// Pick the digest algorithm used when hashing is on.
    pub fn with_hashing_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.hashing_algorithm = Some(algorithm.into());
        self
    }
}
