//! The abstract build-host contract.
//!
//! The plugin never talks to a concrete build system. A host drives it
//! through [`BuildHooks`] at the right lifecycle points and exposes one
//! build's state through [`Compilation`]. The hooks mirror the lifecycle the
//! core design assumes: compilation start, per-import resolution (with
//! deferral), a seal/finalization phase after all modules are processed, and
//! a post-compilation phase for artifact emission. Hooks fire for root
//! builds; nested/child builds are reported via [`Compilation::is_root`] and
//! skipped by the plugin.

use indexmap::IndexMap;

use crate::virtual_modules::VirtualModuleStore;

/// GraphQL content a loader attached to one compiled module.
///
/// Explicit case analysis replaces attribute sniffing: a loader either
/// pre-extracted named operations or passed whole-file source through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphqlAttribute {
    /// Operation name → operation text, pre-extracted by a loader.
    NamedOperations(IndexMap<String, String>),
    /// Whole-file GraphQL source, unprocessed (e.g. a `.graphql` file).
    RawSource(String),
}

/// One compiled module as the host enumerates it, in stable build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Resource path the module was resolved from.
    pub resource: String,
    /// GraphQL content attached by a loader, if any. Modules without it are
    /// skipped by the collector.
    pub graphql: Option<GraphqlAttribute>,
    /// Bundled in-memory source, rewritable until the build is written out.
    pub source: Option<String>,
}

impl ModuleRecord {
    /// A module with no GraphQL content and no bundled source yet.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            graphql: None,
            source: None,
        }
    }

    /// Attach pre-extracted named operations.
    pub fn with_named_operations<N, T>(
        mut self,
        operations: impl IntoIterator<Item = (N, T)>,
    ) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        self.graphql = Some(GraphqlAttribute::NamedOperations(
            operations
                .into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
        ));
        self
    }

    /// Attach raw GraphQL file content.
    pub fn with_raw_source(mut self, source: impl Into<String>) -> Self {
        self.graphql = Some(GraphqlAttribute::RawSource(source.into()));
        self
    }

    /// Attach bundled module source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// One build's state, as seen by the plugin's hooks.
pub trait Compilation {
    /// Whether this is a root build. Nested/child builds never trigger
    /// extraction or emission.
    fn is_root(&self) -> bool;

    /// The compiled modules, in the host's stable enumeration order. The
    /// order is significant: it decides identifier assignment.
    fn modules(&self) -> &[ModuleRecord];

    /// Rewrite the bundled in-memory source of an already-resolved module.
    /// Returns `false` when no module matches `resource`.
    fn rewrite_source(&mut self, resource: &str, source: String) -> bool;

    /// Emit a named build artifact.
    fn emit_asset(&mut self, name: &str, source: String);
}

/// One-shot continuation completing a deferred import resolution.
pub type ResolveContinuation = Box<dyn FnOnce() + Send + 'static>;

/// Lifecycle hooks a host calls on an attached plugin.
pub trait BuildHooks: Send + Sync {
    /// Fired when a build starts, before any module is processed.
    fn compilation_start(&self, compilation: &mut dyn Compilation);

    /// Fired for every import resolution. The plugin must either invoke
    /// `done` before returning or store it and invoke it exactly once later;
    /// the host suspends the resolution until then.
    fn resolve_import(&self, request: &str, done: ResolveContinuation);

    /// Fired at build finalization, after all modules are processed and
    /// before anything is written out.
    fn seal(&self, compilation: &mut dyn Compilation) -> crate::Result<()>;

    /// Fired after compilation, for artifact emission.
    fn after_compile(&self, compilation: &mut dyn Compilation) -> crate::Result<()>;

    /// Virtual modules this plugin serves, for the host to consult during
    /// resolution. `None` when the plugin serves no virtual modules.
    fn virtual_store(&self) -> Option<VirtualModuleStore> {
        None
    }
}
