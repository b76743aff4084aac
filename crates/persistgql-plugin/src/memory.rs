//! In-memory reference host.
//!
//! Drives attached plugins through the full hook lifecycle against an
//! in-memory module set: compilation start → import resolution (suspending
//! on deferred continuations) → seal → after-compile. Used by the
//! integration tests and usable as a template for wiring the plugin into a
//! real build system.

use std::collections::BTreeMap;
use std::sync::{mpsc, Arc};

use crate::host::{BuildHooks, Compilation, ModuleRecord};
use crate::virtual_modules::VirtualModuleStore;

/// One build's in-memory state.
#[derive(Default)]
pub struct MemoryCompilation {
    root: bool,
    modules: Vec<ModuleRecord>,
    assets: BTreeMap<String, String>,
    stores: Vec<VirtualModuleStore>,
}

impl Compilation for MemoryCompilation {
    fn is_root(&self) -> bool {
        self.root
    }

    fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    fn rewrite_source(&mut self, resource: &str, source: String) -> bool {
        match self.modules.iter_mut().find(|module| module.resource == resource) {
            Some(module) => {
                module.source = Some(source);
                true
            }
            None => false,
        }
    }

    fn emit_asset(&mut self, name: &str, source: String) {
        self.assets.insert(name.to_string(), source);
    }
}

/// In-memory compiler hosting any number of [`BuildHooks`] plugins.
///
/// Builder-style setup, then [`run`](Self::run). Import resolution hands each
/// plugin a one-shot continuation and blocks until it fires, so a listener
/// plugin deferring the persisted-query import genuinely suspends this build
/// until its provider notifies — typically from another thread running the
/// provider's build. A provider that never notifies leaves `run` waiting
/// forever; detecting that is out of scope here.
pub struct MemoryCompiler {
    plugins: Vec<Arc<dyn BuildHooks>>,
    imports: Vec<String>,
    compilation: MemoryCompilation,
}

impl MemoryCompiler {
    /// A root-build compiler with no modules, imports, or plugins.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            imports: Vec::new(),
            compilation: MemoryCompilation {
                root: true,
                ..MemoryCompilation::default()
            },
        }
    }

    /// Mark this build as nested (a child compilation). Nested builds never
    /// trigger extraction or emission.
    pub fn nested(mut self) -> Self {
        self.compilation.root = false;
        self
    }

    /// Attach a plugin. Its virtual modules, if any, become resolvable.
    pub fn plugin(mut self, plugin: Arc<dyn BuildHooks>) -> Self {
        if let Some(store) = plugin.virtual_store() {
            self.compilation.stores.push(store);
        }
        self.plugins.push(plugin);
        self
    }

    /// Seed a compiled module (in enumeration order).
    pub fn module(mut self, module: ModuleRecord) -> Self {
        self.compilation.modules.push(module);
        self
    }

    /// Add an import request to resolve during the build.
    pub fn import(mut self, request: impl Into<String>) -> Self {
        self.imports.push(request.into());
        self
    }

    /// Run one full build pass. May be called again to model a rebuild over
    /// the same module set.
    pub fn run(&mut self) -> crate::Result<()> {
        for plugin in &self.plugins {
            plugin.compilation_start(&mut self.compilation);
        }

        for request in self.imports.clone() {
            self.resolve(&request)?;
        }

        for plugin in &self.plugins {
            plugin.seal(&mut self.compilation)?;
        }

        for plugin in &self.plugins {
            plugin.after_compile(&mut self.compilation)?;
        }
        Ok(())
    }

    /// Resolve one import request through every plugin, suspending on
    /// deferrals, then materialize the module from the virtual stores.
    fn resolve(&mut self, request: &str) -> crate::Result<()> {
        for plugin in &self.plugins {
            let (sender, receiver) = mpsc::channel();
            plugin.resolve_import(
                request,
                Box::new(move || {
                    let _ = sender.send(());
                }),
            );
            receiver
                .recv()
                .map_err(|_| crate::Error::ResolutionAborted(request.to_string()))?;
        }

        let source = self
            .compilation
            .stores
            .iter()
            .find_map(|store| store.read(request))
            .map(|content| format!("module.exports = {content};"));

        // Re-resolving (a rebuild) refreshes the bundled source in place.
        match self
            .compilation
            .modules
            .iter_mut()
            .find(|module| module.resource == request)
        {
            Some(existing) => {
                if source.is_some() {
                    existing.source = source;
                }
            }
            None => self.compilation.modules.push(ModuleRecord {
                resource: request.to_string(),
                graphql: None,
                source,
            }),
        }
        Ok(())
    }

    /// The compilation state after (or between) runs.
    pub fn compilation(&self) -> &MemoryCompilation {
        &self.compilation
    }

    /// An emitted asset's content.
    pub fn asset(&self, name: &str) -> Option<&str> {
        self.compilation.assets.get(name).map(String::as_str)
    }

    /// A bundled module's in-memory source.
    pub fn module_source(&self, resource: &str) -> Option<&str> {
        self.compilation
            .modules
            .iter()
            .find(|module| module.resource == resource)
            .and_then(|module| module.source.as_deref())
    }
}

impl Default for MemoryCompiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHooks {
        started: std::sync::atomic::AtomicUsize,
    }

    impl BuildHooks for CountingHooks {
        fn compilation_start(&self, _compilation: &mut dyn Compilation) {
            self.started.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn resolve_import(&self, _request: &str, done: crate::host::ResolveContinuation) {
            done();
        }

        fn seal(&self, _compilation: &mut dyn Compilation) -> crate::Result<()> {
            Ok(())
        }

        fn after_compile(&self, compilation: &mut dyn Compilation) -> crate::Result<()> {
            compilation.emit_asset("marker.txt", "ok".to_string());
            Ok(())
        }
    }

    #[test]
    fn runs_hooks_and_collects_assets() {
        let hooks = Arc::new(CountingHooks {
            started: std::sync::atomic::AtomicUsize::new(0),
        });
        let mut compiler = MemoryCompiler::new().plugin(hooks.clone()).import("entry.js");
        compiler.run().unwrap();

        assert_eq!(hooks.started.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(compiler.asset("marker.txt"), Some("ok"));
        assert_eq!(compiler.compilation().modules().len(), 1);
    }

    #[test]
    fn rewrite_source_reports_missing_modules() {
        let mut compilation = MemoryCompilation::default();
        assert!(!compilation.rewrite_source("missing.js", String::new()));
    }
}
