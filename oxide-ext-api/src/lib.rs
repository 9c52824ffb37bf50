//! oxide-ext-api - Extension API for the oxide host
//!
//! This crate provides the traits and types needed to write extensions.
//! Extensions are native Rust dynamic libraries named `Oxide.<Name>.dll`
//! that the host discovers, loads in tier order, and wires into a shared
//! service registry.
//!
//! # Example
//!
//! ```ignore
//! use oxide_ext_api::{
//!     export_extensions, Extension, ExtensionContext, ExtensionError, FromServices,
//!     ServiceRegistry, VersionNumber,
//! };
//!
//! pub struct MyExtension;
//!
//! impl FromServices for MyExtension {
//!     fn from_services(_services: &ServiceRegistry) -> Result<Self, ExtensionError> {
//!         Ok(Self)
//!     }
//! }
//!
//! impl Extension for MyExtension {
//!     fn name(&self) -> &str {
//!         "MyExtension"
//!     }
//!
//!     fn version(&self) -> VersionNumber {
//!         VersionNumber::new(0, 1, 0)
//!     }
//!
//!     fn author(&self) -> &str {
//!         "me"
//!     }
//!
//!     fn load(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
//!         ctx.log_info("Extension loaded!");
//!         Ok(())
//!     }
//! }
//!
//! export_extensions!(MyExtension);
//! ```

pub mod context;
pub mod error;
pub mod hooks;
pub mod library;
pub mod module;
pub mod services;
pub mod types;

use std::path::Path;

pub use context::{ExtensionContext, HostRegistries};
pub use error::ExtensionError;
pub use hooks::{
    ChangeWatcherRegistry, HookRegistry, PluginChangeWatcher, PluginLoader, PluginLoaderRegistry,
};
pub use library::{Library, LibraryRegistry};
pub use module::{ExportKind, ExtensionFactory, ModuleExport};
pub use services::ServiceRegistry;
pub use types::{DEFAULT_BRANCH, VersionNumber};

/// Current extension API version. Modules must match this exactly.
pub const API_VERSION: u32 = 1;

/// Construction from the service registry.
///
/// The host calls this when it instantiates an extension so constructor
/// dependencies are resolved from registered singletons.
pub trait FromServices: Sized {
    fn from_services(services: &ServiceRegistry) -> Result<Self, ExtensionError>;
}

/// Optional capability: contribute singletons before `load` runs.
///
/// A failure here is logged by the host and the load carries on.
pub trait ConfigureServices {
    fn configure_services(&mut self, services: &mut ServiceRegistry) -> Result<(), ExtensionError>;
}

/// The extension trait - implement this to create an oxide extension.
///
/// Capability flags are read once when the extension is loaded and must not
/// change afterwards. Core and game extensions can never be unloaded.
pub trait Extension: Send {
    fn name(&self) -> &str;

    fn version(&self) -> VersionNumber;

    fn author(&self) -> &str;

    /// Source branch the extension was built from
    fn branch(&self) -> &str {
        DEFAULT_BRANCH
    }

    fn is_core_extension(&self) -> bool {
        false
    }

    fn is_game_extension(&self) -> bool {
        false
    }

    fn supports_reloading(&self) -> bool {
        false
    }

    /// Expose the [`ConfigureServices`] capability.
    ///
    /// Implementors return `Some(self)`; the default means the extension has
    /// nothing to configure.
    fn configure_services_hook(&mut self) -> Option<&mut dyn ConfigureServices> {
        None
    }

    /// One-time initialization. Register libraries and loader hooks here.
    fn load(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError>;

    /// Called before the host drops a reloadable extension.
    fn unload(&mut self, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Called after a directory scan finished loading every module.
    ///
    /// Returning an error removes the extension from the host.
    fn on_all_modules_loaded(&mut self, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Called once the plugin directory is known so the extension can
    /// register change watchers for it.
    fn load_plugin_watchers(
        &mut self,
        _plugin_dir: &Path,
        _ctx: &mut ExtensionContext<'_>,
    ) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Called when the host shuts down.
    fn on_shutdown(&mut self) {}
}
