//! ExtensionManager - loads, unloads and reloads extensions and notifies them
//! of lifecycle events

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxide_ext_api::{
    Extension, ExtensionContext, ExtensionError, HostRegistries, Library, LibraryRegistry,
    PluginChangeWatcher, PluginLoader, ServiceRegistry,
};

use super::builtins::{PERMISSION_LIBRARY, Permission, TIMER_LIBRARY, Timer};
use super::cleanup::CleanupQueue;
use super::diagnostics::{DiagnosticSink, NullSink};
use super::discovery::{self, Tier};
use super::error::{ErrorKind, ExtensionManagerError};
use super::loader::{MappedModule, ModuleLoader, NativeModuleLoader};
use super::set::{ExtensionFlags, ExtensionInfo, ExtensionSet, LoadedExtension};

/// Outcome of a directory scan
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    /// Paths loaded by this scan, in load order
    pub loaded: Vec<(Tier, PathBuf)>,
    /// Paths that failed to load
    pub failed: Vec<(PathBuf, ErrorKind)>,
    /// Extensions removed because their all-modules-loaded hook failed
    pub removed: Vec<PathBuf>,
    /// Stale files queued for cleanup
    pub cleanup: Vec<PathBuf>,
}

/// The extension manager owns every loaded extension and the registries they
/// share.
///
/// All operations are synchronous and expected to run on a single control
/// thread. The fire-and-forget commands (`load_extension`, `unload_extension`,
/// `reload_extension`) log failures and return nothing; the `try_` variants
/// return the same failure to the caller.
pub struct ExtensionManager {
    // Field order is drop order: registry entries and extension instances
    // run module code, so both go before the modules are unmapped.
    registries: HostRegistries,
    extensions: ExtensionSet,
    /// Modules whose extension is gone. Watchers, loaders, services and
    /// library bindings they registered still point into their code, so
    /// they stay mapped for the life of the manager.
    retired: Vec<MappedModule>,
    loader: Box<dyn ModuleLoader>,
    diagnostics: Arc<dyn DiagnosticSink>,
    cleanup: CleanupQueue,
}

impl ExtensionManager {
    /// Create a manager that maps modules with `loader`.
    ///
    /// The built-in `Timer` and `Permission` libraries are registered before
    /// any extension can load.
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        let mut registries = HostRegistries::new();
        registries.libraries.register(
            TIMER_LIBRARY,
            Arc::new(Timer::new()),
            &mut registries.services,
        );
        registries.libraries.register(
            PERMISSION_LIBRARY,
            Arc::new(Permission::new()),
            &mut registries.services,
        );

        Self {
            registries,
            extensions: ExtensionSet::new(),
            retired: Vec::new(),
            loader,
            diagnostics: Arc::new(NullSink),
            cleanup: CleanupQueue::new(),
        }
    }

    /// Create a manager that loads native dynamic libraries
    pub fn with_native_loader() -> Self {
        Self::new(Box::new(NativeModuleLoader::new()))
    }

    /// Builder: forward caught exceptions to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    // ─── Load ────────────────────────────────────────────────────────

    /// Load the extension module at `path`, logging any failure
    pub fn load_extension(&mut self, path: &Path) {
        let _ = self.try_load_extension(path);
    }

    /// Load the extension module at `path`.
    ///
    /// On failure nothing is added to the extension set.
    pub fn try_load_extension(&mut self, path: &Path) -> Result<(), ExtensionManagerError> {
        let result = self.load_inner(path);
        if let Err(e) = &result {
            self.log_failure("load", path, e);
        }
        result
    }

    fn load_inner(&mut self, path: &Path) -> Result<(), ExtensionManagerError> {
        if self.extensions.contains_path(path) {
            return Err(ExtensionManagerError::AlreadyLoaded {
                path: path.to_path_buf(),
            });
        }

        // 1. Map the module
        let module = self.loader.map(path)?;

        // 2-5. Construct, configure and load; module code has run from here on
        let instance = match self.start_extension(path, &module) {
            Ok(instance) => instance,
            Err(e) => {
                self.retire(module);
                return Err(e);
            }
        };

        let entry = LoadedExtension::new(instance, path.to_path_buf(), module);
        let info = entry.info();
        if let Err(rejected) = self.extensions.insert(entry) {
            self.retire(rejected.into_module());
            return Err(ExtensionManagerError::AlreadyLoaded {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(
            extension = %info.name,
            version = %info.display_version(),
            author = %info.author,
            path = %path.display(),
            "Loaded extension {} v{} by {}",
            info.name,
            info.display_version(),
            info.author
        );
        Ok(())
    }

    /// Construct the first exported extension of `module` and run its
    /// configure and load hooks. On failure the instance is already dropped.
    fn start_extension(
        &mut self,
        path: &Path,
        module: &MappedModule,
    ) -> Result<Box<dyn Extension>, ExtensionManagerError> {
        // Pick the first exported extension type
        let Some(export) = module.first_extension() else {
            return Err(ExtensionManagerError::NoExtensionType {
                path: path.to_path_buf(),
            });
        };
        if module.extension_count() > 1 {
            tracing::debug!(
                path = %path.display(),
                using = %export.type_name,
                count = module.extension_count(),
                "Module exports several extension types, using the first"
            );
        }
        let type_name = export.type_name.clone();
        let Some(factory) = export.factory() else {
            return Err(ExtensionManagerError::NoExtensionType {
                path: path.to_path_buf(),
            });
        };

        // Construct with dependencies from the service registry
        let services = &self.registries.services;
        let mut instance = match std::panic::catch_unwind(AssertUnwindSafe(|| factory(services))) {
            Ok(Ok(instance)) => instance,
            Ok(Err(e)) => {
                return Err(ExtensionManagerError::hook_failure(&type_name, "construct", e));
            }
            Err(panic) => {
                return Err(ExtensionManagerError::hook_failure(
                    &type_name,
                    "construct",
                    panic_message(panic.as_ref()),
                ));
            }
        };
        let name = instance.name().to_string();

        // Optional service configuration; failures do not stop the load
        if let Err(e) = Self::configure_services(instance.as_mut(), &name, &mut self.registries.services) {
            tracing::error!(extension = %name, error = %e, "ConfigureServices failed, continuing load");
            self.diagnostics
                .report_exception(&format!("Failed to configure services for {}", name), &e);
        }

        let mut ctx = ExtensionContext::new(name.as_str(), &mut self.registries);
        run_hook(&name, "load", || instance.load(&mut ctx))?;
        Ok(instance)
    }

    fn configure_services(
        instance: &mut dyn Extension,
        name: &str,
        services: &mut ServiceRegistry,
    ) -> Result<(), ExtensionManagerError> {
        let Some(hook) = instance.configure_services_hook() else {
            return Ok(());
        };

        match std::panic::catch_unwind(AssertUnwindSafe(|| hook.configure_services(services))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(ExtensionManagerError::ConfigureServicesFailure {
                name: name.to_string(),
                source,
            }),
            Err(panic) => Err(ExtensionManagerError::ConfigureServicesFailure {
                name: name.to_string(),
                source: ExtensionError::custom(panic_message(panic.as_ref())),
            }),
        }
    }

    // ─── Unload ──────────────────────────────────────────────────────

    /// Unload the extension loaded from `path`, logging any failure
    pub fn unload_extension(&mut self, path: &Path) {
        let _ = self.try_unload_extension(path);
    }

    /// Unload the extension loaded from `path`.
    ///
    /// Core and game extensions and extensions without reload support are
    /// never removed. Extensions that depend on this one are left alone.
    pub fn try_unload_extension(&mut self, path: &Path) -> Result<(), ExtensionManagerError> {
        let result = self.unload_inner(path);
        if let Err(e) = &result {
            self.log_failure("unload", path, e);
        }
        result
    }

    fn unload_inner(&mut self, path: &Path) -> Result<(), ExtensionManagerError> {
        let entry = self
            .extensions
            .get_by_path_mut(path)
            .ok_or_else(|| ExtensionManagerError::NotLoaded {
                path: path.to_path_buf(),
            })?;

        check_unloadable(entry.name(), entry.flags())?;

        let name = entry.name().to_string();
        {
            let mut ctx = ExtensionContext::new(name.as_str(), &mut self.registries);
            run_hook(&name, "unload", || entry.extension_mut().unload(&mut ctx))?;
        }

        if let Some(removed) = self.extensions.remove_by_path(path) {
            let info = removed.info();
            self.retire(removed.into_module());
            tracing::info!(
                extension = %info.name,
                version = %info.display_version(),
                author = %info.author,
                "Unloaded extension {} v{} by {}",
                info.name,
                info.display_version(),
                info.author
            );
        }
        Ok(())
    }

    // ─── Reload ──────────────────────────────────────────────────────

    /// Reload the extension for `path`, logging any failure
    pub fn reload_extension(&mut self, path: &Path) {
        let _ = self.try_reload_extension(path);
    }

    /// Reload the extension whose name matches the module at `path`.
    ///
    /// Matching is by the name derived from the file (`Oxide.Foo.dll` ->
    /// `Foo`), not by exact path. Without a match this is a plain load.
    /// Otherwise the matched extension is unloaded and `path` is loaded; if
    /// that load fails the extension stays unloaded.
    pub fn try_reload_extension(&mut self, path: &Path) -> Result<(), ExtensionManagerError> {
        let matched = discovery::derive_extension_name(path)
            .and_then(|name| self.extensions.get_by_name(&name))
            .map(|entry| (entry.name().to_string(), entry.flags(), entry.path().to_path_buf()));

        let Some((name, flags, loaded_path)) = matched else {
            return self.try_load_extension(path);
        };

        if let Err(e) = check_unloadable(&name, flags) {
            self.log_failure("reload", path, &e);
            return Err(e);
        }

        self.try_unload_extension(&loaded_path)?;
        self.try_load_extension(path)?;

        tracing::info!(extension = %name, path = %path.display(), "Reloaded extension {}", name);
        Ok(())
    }

    // ─── Directory scan ──────────────────────────────────────────────

    /// Load every extension module in `dir`, core tier first, then game,
    /// then everything else.
    ///
    /// Failures in one tier do not stop later tiers. Afterwards every loaded
    /// extension, including ones loaded by earlier scans, is told that all
    /// modules are present; an extension failing that hook is removed.
    pub fn load_all_extensions(&mut self, dir: &Path) -> ScanReport {
        let mut report = ScanReport::default();

        let scan = match discovery::scan_directory(dir) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "Failed to scan extension directory");
                return report;
            }
        };

        for path in &scan.cleanup {
            self.cleanup.add(path.clone());
        }
        report.cleanup = scan.cleanup.clone();

        tracing::debug!(
            dir = %dir.display(),
            core = scan.core.len(),
            game = scan.game.len(),
            other = scan.other.len(),
            stale = scan.cleanup.len(),
            "Discovered extension modules"
        );

        for (tier, path) in scan.load_order() {
            match self.try_load_extension(path) {
                Ok(()) => report.loaded.push((tier, path.clone())),
                Err(e) => report.failed.push((path.clone(), e.kind())),
            }
        }

        report.removed = self.notify_all_modules_loaded();
        report
    }

    /// Run `on_all_modules_loaded` on every loaded extension and remove the
    /// ones that fail. Protection of core and game extensions does not apply
    /// here.
    fn notify_all_modules_loaded(&mut self) -> Vec<PathBuf> {
        let mut failures = Vec::new();

        for entry in self.extensions.iter_mut() {
            let name = entry.name().to_string();
            let mut ctx = ExtensionContext::new(name.as_str(), &mut self.registries);
            if let Err(e) = run_hook(&name, "on_all_modules_loaded", || {
                entry.extension_mut().on_all_modules_loaded(&mut ctx)
            }) {
                failures.push((entry.path().to_path_buf(), e));
            }
        }

        let mut removed = Vec::with_capacity(failures.len());
        for (path, error) in failures {
            tracing::error!(
                path = %path.display(),
                error = %error,
                "Extension failed to initialize after all modules loaded, removing it"
            );
            self.diagnostics.report_exception(
                &format!("Failed to initialize extension at {}", path.display()),
                &error,
            );
            if let Some(entry) = self.extensions.remove_by_path(&path) {
                self.retire(entry.into_module());
                removed.push(path);
            }
        }
        removed
    }

    /// Let every loaded extension register change watchers for `plugin_dir`.
    ///
    /// Failures are logged; the extension stays loaded.
    pub fn load_plugin_watchers(&mut self, plugin_dir: &Path) {
        let mut failures = Vec::new();

        for entry in self.extensions.iter_mut() {
            let name = entry.name().to_string();
            let mut ctx = ExtensionContext::new(name.as_str(), &mut self.registries);
            if let Err(e) = run_hook(&name, "load_plugin_watchers", || {
                entry.extension_mut().load_plugin_watchers(plugin_dir, &mut ctx)
            }) {
                failures.push((entry.path().to_path_buf(), e));
            }
        }

        for (path, error) in failures {
            tracing::error!(path = %path.display(), error = %error, "Failed to load plugin watchers");
            self.diagnostics.report_exception(
                &format!("Failed to load plugin watchers for {}", path.display()),
                &error,
            );
        }
    }

    /// Tell every loaded extension that the host is shutting down
    pub fn shutdown(&mut self) {
        for entry in self.extensions.iter_mut() {
            let name = entry.name().to_string();
            let result = run_hook(&name, "on_shutdown", || {
                entry.extension_mut().on_shutdown();
                Ok(())
            });
            if let Err(e) = result {
                tracing::error!(extension = %name, error = %e, "Extension failed during shutdown");
            }
        }
        tracing::debug!(extensions = self.extensions.len(), "Extension manager shut down");
    }

    // ─── Queries ─────────────────────────────────────────────────────

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn extension_infos(&self) -> Vec<ExtensionInfo> {
        self.extensions.infos()
    }

    pub fn get_extension(&self, name: &str) -> Option<&LoadedExtension> {
        self.extensions.get_by_name(name)
    }

    pub fn is_extension_present(&self, name: &str) -> bool {
        self.extensions.get_by_name(name).is_some()
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.registries.services
    }

    /// Host access for publishing singletons before extensions are loaded
    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registries.services
    }

    pub fn libraries(&self) -> &LibraryRegistry {
        &self.registries.libraries
    }

    /// Register a library on behalf of the host
    pub fn register_library<L: Library>(&mut self, name: &str, library: Arc<L>) -> bool {
        let registries = &mut self.registries;
        registries
            .libraries
            .register(name, library, &mut registries.services)
    }

    pub fn get_library(&self, name: &str) -> Option<Arc<dyn Library>> {
        self.registries
            .libraries
            .resolve(name, &self.registries.services)
    }

    pub fn get_library_as<L: Library>(&self, name: &str) -> Option<Arc<L>> {
        self.registries
            .libraries
            .resolve_as(name, &self.registries.services)
    }

    pub fn plugin_loaders(&self) -> &[Arc<dyn PluginLoader>] {
        self.registries.plugin_loaders.get_all()
    }

    pub fn plugin_change_watchers(&self) -> &[Arc<dyn PluginChangeWatcher>] {
        self.registries.change_watchers.get_all()
    }

    pub fn cleanup_queue(&self) -> &CleanupQueue {
        &self.cleanup
    }

    /// Delete the stale module files queued by directory scans
    pub fn run_cleanup(&mut self) -> usize {
        self.cleanup.run()
    }

    fn retire(&mut self, module: MappedModule) {
        self.retired.push(module);
        tracing::debug!(retired = self.retired.len(), "Module kept mapped after its extension was removed");
    }

    fn log_failure(&self, operation: &'static str, path: &Path, error: &ExtensionManagerError) {
        if error.is_precondition() {
            tracing::error!(
                operation,
                path = %path.display(),
                kind = ?error.kind(),
                "{}",
                error
            );
        } else {
            tracing::error!(
                operation,
                path = %path.display(),
                kind = ?error.kind(),
                error = ?error,
                "Failed to {} extension: {}",
                operation,
                error
            );
            self.diagnostics.report_exception(
                &format!("Failed to {} extension at {}", operation, path.display()),
                error,
            );
        }
    }
}

impl std::fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("extensions", &self.extensions.paths())
            .field("libraries", &self.registries.libraries.len())
            .field("retired_modules", &self.retired.len())
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

fn check_unloadable(name: &str, flags: ExtensionFlags) -> Result<(), ExtensionManagerError> {
    if flags.is_protected() {
        return Err(ExtensionManagerError::ProtectedExtension {
            name: name.to_string(),
        });
    }
    if !flags.supports_reloading {
        return Err(ExtensionManagerError::ReloadUnsupported {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Run an extension hook with panic isolation
fn run_hook<F>(name: &str, hook: &'static str, f: F) -> Result<(), ExtensionManagerError>
where
    F: FnOnce() -> Result<(), ExtensionError>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ExtensionManagerError::hook_failure(name, hook, e)),
        Err(panic) => Err(ExtensionManagerError::hook_failure(
            name,
            hook,
            panic_message(panic.as_ref()),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
