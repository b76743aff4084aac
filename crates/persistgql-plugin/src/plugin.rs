//! The persisted-queries plugin: collector, notifier, and output sink wired
//! into the host's build lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;
use persistgql_extract::{HashingAlgorithm, IdStrategy, QueryMapBuilder};

use crate::collector::OperationCollector;
use crate::host::{BuildHooks, Compilation, ResolveContinuation};
use crate::options::PluginOptions;
use crate::virtual_modules::VirtualModuleStore;

/// Pre-seeded virtual module content before any map exists, so resolution of
/// the import never fails outright in a build that has not sealed yet.
const PLACEHOLDER: &str = "{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Computes its own map at seal time; may have listeners.
    Standalone,
    /// Never computes; adopts whatever its provider broadcasts.
    Listener,
}

/// Lifecycle of the published map for one plugin instance.
#[derive(Default)]
struct PublishState {
    /// Serialized form of the most recently published map; `None` until the
    /// first computation or notification.
    current: Option<String>,
    /// Resolutions of the virtual-module import waiting on the first map.
    /// Drained and invoked exactly once, on first notification.
    waiting: Vec<ResolveContinuation>,
}

/// Publishes a persisted query map as a virtual module and build artifact.
///
/// Constructed as `Arc<Self>` so provider instances can hold their listeners
/// and hosts can share the instance across hook invocations. The published
/// map and the virtual-module slot are exclusively owned by this instance;
/// the listener list is append-only and fixed before any build runs.
pub struct PersistedQueriesPlugin {
    options: PluginOptions,
    role: Role,
    builder: QueryMapBuilder,
    virtual_modules: VirtualModuleStore,
    listeners: Mutex<Vec<Arc<PersistedQueriesPlugin>>>,
    state: Mutex<PublishState>,
}

impl PersistedQueriesPlugin {
    /// A standalone instance (a provider, once listeners register with it).
    pub fn new(options: PluginOptions) -> crate::Result<Arc<Self>> {
        Ok(Arc::new(Self::with_role(options, Role::Standalone)?))
    }

    /// A listener fed by `provider`. Registers with the provider immediately;
    /// registration order is notification order.
    pub fn listening_to(
        options: PluginOptions,
        provider: &Arc<Self>,
    ) -> crate::Result<Arc<Self>> {
        let listener = Arc::new(Self::with_role(options, Role::Listener)?);
        provider.listeners.lock().push(Arc::clone(&listener));
        Ok(listener)
    }

    fn with_role(options: PluginOptions, role: Role) -> crate::Result<Self> {
        if options.module_name.is_empty() {
            return Err(crate::Error::InvalidConfig(
                "moduleName is required".to_string(),
            ));
        }

        let ids = if options.use_hashes {
            // An absent algorithm name means the sha512 default, without the
            // unrecognized-name warning.
            IdStrategy::Hashed(
                HashingAlgorithm::from_name(options.hashing_algorithm.as_deref().unwrap_or("sha512")),
            )
        } else {
            IdStrategy::Sequential
        };

        Ok(Self {
            builder: QueryMapBuilder::new()
                .with_add_typename(options.add_typename)
                .with_id_strategy(ids),
            role,
            virtual_modules: VirtualModuleStore::new(),
            listeners: Mutex::new(Vec::new()),
            state: Mutex::new(PublishState::default()),
            options,
        })
    }

    /// The options this instance was built with.
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Serialized form of the currently published map, if one exists.
    pub fn current_map(&self) -> Option<String> {
        self.state.lock().current.clone()
    }

    /// The virtual-module store this instance publishes through.
    pub fn virtual_modules(&self) -> &VirtualModuleStore {
        &self.virtual_modules
    }

    fn matches_module_name(&self, resource: &str) -> bool {
        resource == self.options.module_name || resource.ends_with(&self.options.module_name)
    }

    /// Republish `serialized` into the current build: update state, rewrite
    /// the virtual module, and patch any already-bundled copy in place.
    fn republish(&self, compilation: &mut dyn Compilation, serialized: &str) {
        self.state.lock().current = Some(serialized.to_string());
        self.virtual_modules
            .write(&self.options.module_name, serialized);

        let bundled: Vec<String> = compilation
            .modules()
            .iter()
            .filter(|module| self.matches_module_name(&module.resource))
            .map(|module| module.resource.clone())
            .collect();
        for resource in bundled {
            compilation.rewrite_source(&resource, format!("module.exports = {serialized};"));
        }
    }

    /// Listener entry point: adopt the provider's map and complete any
    /// resolution that was waiting on it.
    fn notify(&self, serialized: &str) {
        let waiting = {
            let mut state = self.state.lock();
            if state.current.as_deref() != Some(serialized) {
                self.virtual_modules
                    .write(&self.options.module_name, serialized);
                state.current = Some(serialized.to_string());
            }
            std::mem::take(&mut state.waiting)
        };
        for done in waiting {
            done();
        }
    }
}

impl BuildHooks for PersistedQueriesPlugin {
    fn compilation_start(&self, compilation: &mut dyn Compilation) {
        if !compilation.is_root() {
            return;
        }
        // Holding the state lock keeps the placeholder from clobbering a map
        // a provider broadcasts concurrently.
        let state = self.state.lock();
        if state.current.is_none() {
            self.virtual_modules
                .write(&self.options.module_name, PLACEHOLDER);
        }
    }

    fn resolve_import(&self, request: &str, done: ResolveContinuation) {
        if self.role == Role::Listener && request.contains(&self.options.module_name) {
            let mut state = self.state.lock();
            if state.current.is_none() {
                tracing::debug!(request, "deferring resolution until provider notifies");
                state.waiting.push(done);
                return;
            }
        }
        done();
    }

    fn seal(&self, compilation: &mut dyn Compilation) -> crate::Result<()> {
        if self.role == Role::Listener || !compilation.is_root() {
            return Ok(());
        }

        let collected = OperationCollector::new()
            .with_add_typename(self.options.add_typename)
            .collect(compilation.modules())?;
        let map = self.builder.build(&collected.operations, &collected.raw_blob)?;
        let serialized = map.to_json().map_err(crate::Error::Extract)?;

        let changed = self.state.lock().current.as_deref() != Some(serialized.as_str());
        if !changed {
            tracing::debug!("query map unchanged, skipping republish");
            return Ok(());
        }

        tracing::debug!(operations = map.len(), "publishing persisted query map");
        self.republish(compilation, &serialized);

        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.notify(&serialized);
        }
        Ok(())
    }

    fn after_compile(&self, compilation: &mut dyn Compilation) -> crate::Result<()> {
        if !compilation.is_root() {
            return Ok(());
        }
        if let Some(filename) = &self.options.filename {
            let serialized = self
                .state
                .lock()
                .current
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            compilation.emit_asset(filename, serialized);
        }
        Ok(())
    }

    fn virtual_store(&self) -> Option<VirtualModuleStore> {
        Some(self.virtual_modules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_name_is_a_construction_error() {
        let result = PersistedQueriesPlugin::new(PluginOptions::new(""));
        assert!(matches!(result, Err(crate::Error::InvalidConfig(_))));
    }

    #[test]
    fn listeners_register_in_order() {
        let provider =
            PersistedQueriesPlugin::new(PluginOptions::new("persisted_queries.json")).unwrap();
        let first = PersistedQueriesPlugin::listening_to(
            PluginOptions::new("persisted_queries.json"),
            &provider,
        )
        .unwrap();
        let second = PersistedQueriesPlugin::listening_to(
            PluginOptions::new("persisted_queries.json"),
            &provider,
        )
        .unwrap();

        let listeners = provider.listeners.lock();
        assert_eq!(listeners.len(), 2);
        assert!(Arc::ptr_eq(&listeners[0], &first));
        assert!(Arc::ptr_eq(&listeners[1], &second));
    }

    #[test]
    fn plugin_starts_with_no_map() {
        let plugin =
            PersistedQueriesPlugin::new(PluginOptions::new("persisted_queries.json")).unwrap();
        assert_eq!(plugin.current_map(), None);
    }

    #[test]
    fn notify_adopts_the_map_and_drains_waiters() {
        let provider =
            PersistedQueriesPlugin::new(PluginOptions::new("persisted_queries.json")).unwrap();
        let listener = PersistedQueriesPlugin::listening_to(
            PluginOptions::new("persisted_queries.json"),
            &provider,
        )
        .unwrap();

        let (sender, receiver) = std::sync::mpsc::channel();
        listener.resolve_import(
            "persisted_queries.json",
            Box::new(move || {
                let _ = sender.send(());
            }),
        );
        assert!(receiver.try_recv().is_err());

        listener.notify("{\"q\":1}");
        assert!(receiver.try_recv().is_ok());
        assert_eq!(listener.current_map().as_deref(), Some("{\"q\":1}"));
        assert_eq!(
            listener.virtual_modules().read("persisted_queries.json").as_deref(),
            Some("{\"q\":1}")
        );
    }

    #[test]
    fn unrelated_requests_resolve_immediately_on_listeners() {
        let provider =
            PersistedQueriesPlugin::new(PluginOptions::new("persisted_queries.json")).unwrap();
        let listener = PersistedQueriesPlugin::listening_to(
            PluginOptions::new("persisted_queries.json"),
            &provider,
        )
        .unwrap();

        let (sender, receiver) = std::sync::mpsc::channel();
        listener.resolve_import(
            "lodash",
            Box::new(move || {
                let _ = sender.send(());
            }),
        );
        assert!(receiver.try_recv().is_ok());
    }
}
