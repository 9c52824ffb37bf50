//! oxide-core: Core library for the oxide extension host
//!
//! This crate provides the extension lifecycle for oxide:
//!
//! - **Discovery** - [`extensions::scan_directory`] finds extension modules and orders them by tier
//! - **Lifecycle** - [`ExtensionManager`] loads, unloads and reloads extensions
//! - **Registries** - libraries, plugin loaders and plugin change watchers shared between extensions
//! - **Diagnostics** - [`DiagnosticSink`] receives every caught extension failure
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use oxide_core::ExtensionManager;
//!
//! let mut manager = ExtensionManager::with_native_loader();
//! let report = manager.load_all_extensions(Path::new("/srv/oxide/extensions"));
//! println!("Loaded {} extensions", report.loaded.len());
//!
//! for info in manager.extension_infos() {
//!     println!("{} v{} by {}", info.name, info.display_version(), info.author);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ExtensionManager                  │
//! │  ┌───────────────┐  ┌──────────────────────────┐ │
//! │  │ ModuleLoader  │  │      HostRegistries      │ │
//! │  │ (libloading)  │  │ services / libraries /   │ │
//! │  └───────────────┘  │ loaders / watchers       │ │
//! │  ┌───────────────┐  └──────────────────────────┘ │
//! │  │ ExtensionSet  │  ┌──────────────────────────┐ │
//! │  │ (load order)  │  │ CleanupQueue  Diagnostics│ │
//! │  └───────────────┘  └──────────────────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod extensions;

// Re-export key types for convenience
pub use extensions::{
    DiagnosticSink, ErrorKind, ExtensionInfo, ExtensionManager, ExtensionManagerError,
    ExtensionSet, LoadedExtension, MemorySink, ModuleLoader, NativeModuleLoader, ScanReport,
    StaticModuleLoader, Tier,
};
