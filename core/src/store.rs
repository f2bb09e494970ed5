//! Host-side module registry and the resource plugin.
//!
//! # Design
//! The host owns a registry and hands out `Arc` handles to the modules it
//! holds; there is no global state. `resource_plugin` is the entry point: it
//! captures a client and transport, and the returned factory registers one
//! namespaced module when applied to any `ModuleRegistry`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::client::ResourceClient;
use crate::http::Transport;
use crate::module::ResourceModule;

/// Registration interface a host store exposes to plugins.
pub trait ModuleRegistry<T> {
    /// Register `module` under `name`, replacing any module already there.
    fn register_module(&mut self, name: &str, module: ResourceModule<T>) -> Arc<ResourceModule<T>>;

    /// Tear down the module registered under `name`, returning it if present.
    fn unregister_module(&mut self, name: &str) -> Option<Arc<ResourceModule<T>>>;

    fn module(&self, name: &str) -> Option<Arc<ResourceModule<T>>>;
}

/// In-memory registry keyed by resource name.
#[derive(Debug)]
pub struct Store<T> {
    modules: HashMap<String, Arc<ResourceModule<T>>>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all registered modules, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T: Transport> ModuleRegistry<T> for Store<T> {
    fn register_module(&mut self, name: &str, module: ResourceModule<T>) -> Arc<ResourceModule<T>> {
        let module = Arc::new(module);
        if self.modules.insert(name.to_string(), Arc::clone(&module)).is_some() {
            info!(module = name, "replaced registered module");
        } else {
            info!(module = name, "registered module");
        }
        module
    }

    fn unregister_module(&mut self, name: &str) -> Option<Arc<ResourceModule<T>>> {
        let removed = self.modules.remove(name);
        if removed.is_some() {
            info!(module = name, "unregistered module");
        }
        removed
    }

    fn module(&self, name: &str) -> Option<Arc<ResourceModule<T>>> {
        self.modules.get(name).cloned()
    }
}

/// Build the plugin for one resource.
///
/// The returned factory registers a fresh module, named after the client's
/// resource, in whatever registry it is applied to.
pub fn resource_plugin<T, R>(
    client: ResourceClient,
    transport: T,
) -> impl FnOnce(&mut R) -> Arc<ResourceModule<T>>
where
    T: Transport,
    R: ModuleRegistry<T> + ?Sized,
{
    move |registry: &mut R| {
        let name = client.resource().to_string();
        registry.register_module(&name, ResourceModule::new(client, transport))
    }
}
