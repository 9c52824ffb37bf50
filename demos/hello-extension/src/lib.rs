//! Hello Extension - A simple example extension for oxide
//!
//! This extension demonstrates:
//! - Basic extension structure with the `export_extensions!` macro
//! - Constructing from the service registry (`FromServices`)
//! - Publishing a singleton through the optional `ConfigureServices` capability
//! - Registering a plugin change watcher once the plugin directory is known
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! Modules are discovered by file name, so the library is copied under the
//! `Oxide.<Name>.dll` convention regardless of platform:
//!
//! ```bash
//! mkdir -p ~/.local/share/oxide/extensions
//! cp target/release/libhello_extension.so ~/.local/share/oxide/extensions/Oxide.Hello.dll
//! oxide load
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxide_ext_api::{
    ConfigureServices, Extension, ExtensionContext, ExtensionError, FromServices,
    PluginChangeWatcher, ServiceRegistry, VersionNumber, export_extensions,
};

/// Greeting published for other extensions to pick up
pub struct Greeting(pub String);

/// Watches `*.hello` files in the plugin directory
struct HelloWatcher {
    directory: PathBuf,
}

impl PluginChangeWatcher for HelloWatcher {
    fn directory(&self) -> &Path {
        &self.directory
    }

    fn filter(&self) -> &str {
        "*.hello"
    }
}

/// A reloadable extension that greets the host.
#[derive(Default)]
pub struct HelloExtension {
    /// Number of times `load` ran in this process
    loads: u32,
}

impl FromServices for HelloExtension {
    fn from_services(_services: &ServiceRegistry) -> Result<Self, ExtensionError> {
        Ok(Self::default())
    }
}

impl ConfigureServices for HelloExtension {
    fn configure_services(&mut self, services: &mut ServiceRegistry) -> Result<(), ExtensionError> {
        services.add_singleton(Arc::new(Greeting("Hello from oxide!".to_string())));
        Ok(())
    }
}

impl Extension for HelloExtension {
    fn name(&self) -> &str {
        "Hello"
    }

    fn version(&self) -> VersionNumber {
        VersionNumber::new(0, 1, 0)
    }

    fn author(&self) -> &str {
        "oxide-team"
    }

    fn supports_reloading(&self) -> bool {
        true
    }

    fn configure_services_hook(&mut self) -> Option<&mut dyn ConfigureServices> {
        Some(self)
    }

    fn load(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        self.loads += 1;
        if let Some(greeting) = ctx.services().get_service::<Greeting>() {
            ctx.log_info(&greeting.0);
        }
        if ctx.get_library("Permission").is_none() {
            ctx.log_warn("Permission library is not available");
        }
        Ok(())
    }

    fn unload(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        ctx.log_info(&format!("Goodbye after {} load(s)", self.loads));
        Ok(())
    }

    fn load_plugin_watchers(
        &mut self,
        plugin_dir: &Path,
        ctx: &mut ExtensionContext<'_>,
    ) -> Result<(), ExtensionError> {
        ctx.register_change_watcher(Arc::new(HelloWatcher {
            directory: plugin_dir.to_path_buf(),
        }));
        Ok(())
    }
}

// This macro generates the C ABI entry points for dynamic loading
export_extensions!(HelloExtension);
