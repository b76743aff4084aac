//! # persistgql-plugin
//!
//! Build-time plugin that publishes a persisted GraphQL query map — computed
//! by [`persistgql_extract`] from the operations discovered across a build's
//! compiled modules — as an importable virtual module and, optionally, as a
//! named build artifact.
//!
//! The host build system is abstract: anything that can enumerate compiled
//! modules, fire finalization hooks, defer an import resolution, and serve
//! in-memory modules can drive the plugin through the [`host`] traits. An
//! in-memory reference host lives in [`memory`].
//!
//! ## Roles
//!
//! A plugin instance is standalone, a provider, or a listener. Standalone and
//! provider instances extract and compute their own map at build
//! finalization; a listener never computes — it adopts whatever map its
//! provider broadcasts, and stalls resolution of the virtual-module import
//! until the first broadcast arrives, so a listener build can never bundle
//! the empty placeholder once a provider exists.
//!
//! ## Quick Start
//!
//! ```
//! use persistgql_plugin::{MemoryCompiler, ModuleRecord, PersistedQueriesPlugin, PluginOptions};
//!
//! # fn main() -> persistgql_plugin::Result<()> {
//! let plugin = PersistedQueriesPlugin::new(
//!     PluginOptions::new("persisted_queries.json").with_filename("output_queries.json"),
//! )?;
//!
//! let mut compiler = MemoryCompiler::new()
//!     .plugin(plugin)
//!     .module(ModuleRecord::new("entry.js").with_named_operations([(
//!         "getCount",
//!         "query getCount { count { amount } }",
//!     )]));
//! compiler.run()?;
//!
//! assert!(compiler.asset("output_queries.json").unwrap().starts_with("{\"query getCount"));
//! # Ok(()) }
//! ```

pub mod collector;
pub mod host;
pub mod memory;
pub mod options;
pub mod plugin;
pub mod virtual_modules;

pub use collector::{CollectedOperations, OperationCollector};
pub use host::{BuildHooks, Compilation, GraphqlAttribute, ModuleRecord, ResolveContinuation};
pub use memory::MemoryCompiler;
pub use options::PluginOptions;
pub use plugin::PersistedQueriesPlugin;
pub use virtual_modules::VirtualModuleStore;

/// Error types for plugin construction and build hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration, surfaced at construction before any build runs.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Extraction or map building failed; the build's finalization aborts.
    #[error(transparent)]
    Extract(#[from] persistgql_extract::Error),

    /// A deferred import resolution can no longer complete because the
    /// resolving side went away.
    #[error("import resolution aborted for {0}")]
    ResolutionAborted(String),
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, Error>;
