//! ExtensionContext - an extension's window onto the host registries

use std::sync::Arc;

use crate::hooks::{ChangeWatcherRegistry, PluginChangeWatcher, PluginLoader, PluginLoaderRegistry};
use crate::library::{Library, LibraryRegistry};
use crate::services::ServiceRegistry;

/// Registries owned by the extension manager.
///
/// Only the manager holds this value; extensions reach it through an
/// [`ExtensionContext`] for the duration of a single hook call.
#[derive(Default)]
pub struct HostRegistries {
    pub services: ServiceRegistry,
    pub libraries: LibraryRegistry,
    pub plugin_loaders: PluginLoaderRegistry,
    pub change_watchers: ChangeWatcherRegistry,
}

impl HostRegistries {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Passed to every lifecycle hook.
///
/// Provides access to:
/// - The shared service registry
/// - Library registration and lookup
/// - Plugin loader and change watcher registration
/// - Logging prefixed with the extension name
pub struct ExtensionContext<'a> {
    extension_name: String,
    registries: &'a mut HostRegistries,
}

impl<'a> ExtensionContext<'a> {
    pub fn new(extension_name: impl Into<String>, registries: &'a mut HostRegistries) -> Self {
        Self {
            extension_name: extension_name.into(),
            registries,
        }
    }

    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    // ─── Services ────────────────────────────────────────────────────

    pub fn services(&self) -> &ServiceRegistry {
        &self.registries.services
    }

    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registries.services
    }

    // ─── Libraries ───────────────────────────────────────────────────

    /// Register a library under `name`.
    ///
    /// Returns `false` if the name is already taken; the error is logged and
    /// the existing library stays in place.
    pub fn register_library<L: Library>(&mut self, name: &str, library: Arc<L>) -> bool {
        let registries = &mut *self.registries;
        registries
            .libraries
            .register(name, library, &mut registries.services)
    }

    pub fn get_library(&self, name: &str) -> Option<Arc<dyn Library>> {
        self.registries
            .libraries
            .resolve(name, &self.registries.services)
    }

    /// Look up a library and downcast it to its concrete type
    ///
    /// # Example
    /// ```ignore
    /// let timer: Option<Arc<Timer>> = ctx.get_library_as("Timer");
    /// ```
    pub fn get_library_as<L: Library>(&self, name: &str) -> Option<Arc<L>> {
        self.registries
            .libraries
            .resolve_as(name, &self.registries.services)
    }

    // ─── Loader hooks ────────────────────────────────────────────────

    pub fn register_plugin_loader(&mut self, loader: Arc<dyn PluginLoader>) {
        tracing::debug!(
            extension = %self.extension_name,
            file_extension = loader.file_extension(),
            "Registered plugin loader"
        );
        self.registries.plugin_loaders.register(loader);
    }

    pub fn register_change_watcher(&mut self, watcher: Arc<dyn PluginChangeWatcher>) {
        tracing::debug!(
            extension = %self.extension_name,
            directory = %watcher.directory().display(),
            "Registered plugin change watcher"
        );
        self.registries.change_watchers.register(watcher);
    }

    pub fn plugin_loaders(&self) -> &[Arc<dyn PluginLoader>] {
        self.registries.plugin_loaders.get_all()
    }

    pub fn change_watchers(&self) -> &[Arc<dyn PluginChangeWatcher>] {
        self.registries.change_watchers.get_all()
    }

    // ─── Logging ─────────────────────────────────────────────────────

    /// Log an info message (automatically prefixed with extension name)
    pub fn log_info(&self, message: &str) {
        tracing::info!(extension = %self.extension_name, "{}", message);
    }

    pub fn log_warn(&self, message: &str) {
        tracing::warn!(extension = %self.extension_name, "{}", message);
    }

    pub fn log_error(&self, message: &str) {
        tracing::error!(extension = %self.extension_name, "{}", message);
    }

    pub fn log_debug(&self, message: &str) {
        tracing::debug!(extension = %self.extension_name, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    struct Permission;

    impl Library for Permission {}

    struct CsLoader;

    impl PluginLoader for CsLoader {
        fn file_extension(&self) -> &str {
            "cs"
        }
    }

    struct Watcher(PathBuf);

    impl PluginChangeWatcher for Watcher {
        fn directory(&self) -> &Path {
            &self.0
        }

        fn filter(&self) -> &str {
            "*.cs"
        }
    }

    #[test]
    fn test_context_name() {
        let mut registries = HostRegistries::new();
        let ctx = ExtensionContext::new("CSharp", &mut registries);
        assert_eq!(ctx.extension_name(), "CSharp");
    }

    #[test]
    fn test_register_library_through_context() {
        let mut registries = HostRegistries::new();
        {
            let mut ctx = ExtensionContext::new("Core", &mut registries);
            assert!(ctx.register_library("Permission", Arc::new(Permission)));
            assert!(!ctx.register_library("Permission", Arc::new(Permission)));
            assert!(ctx.get_library("Permission").is_some());
            assert!(ctx.get_library_as::<Permission>("Permission").is_some());
        }
        assert!(registries.libraries.contains("Permission"));
        assert!(registries.services.contains::<Permission>());
    }

    #[test]
    fn test_register_hooks_through_context() {
        let mut registries = HostRegistries::new();
        {
            let mut ctx = ExtensionContext::new("CSharp", &mut registries);
            ctx.register_plugin_loader(Arc::new(CsLoader));
            ctx.register_change_watcher(Arc::new(Watcher(PathBuf::from("/plugins"))));
            assert_eq!(ctx.plugin_loaders().len(), 1);
            assert_eq!(ctx.change_watchers().len(), 1);
        }
        assert_eq!(registries.plugin_loaders.len(), 1);
        assert_eq!(registries.change_watchers.len(), 1);
    }

    #[test]
    fn test_services_mut_through_context() {
        struct Config(u8);

        let mut registries = HostRegistries::new();
        let mut ctx = ExtensionContext::new("Core", &mut registries);
        ctx.services_mut().add_singleton(Arc::new(Config(3)));
        assert_eq!(ctx.services().get_service::<Config>().unwrap().0, 3);
    }
}
