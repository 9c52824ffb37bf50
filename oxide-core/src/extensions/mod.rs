//! Extension lifecycle management for oxide
//!
//! This module discovers, loads and unloads the extension modules that make
//! up a running host:
//!
//! - [`ExtensionManager`]: Owns the loaded extensions and shared registries
//! - [`ExtensionSet`]: Loaded extensions in load order, keyed by module path
//! - [`ModuleLoader`]: Maps a module file into the process and reads its exports
//! - [`ExtensionManagerError`]: Error types for lifecycle operations
//!
//! # Discovery
//!
//! Modules are files named `Oxide.<Name>.dll` in the extension directory.
//! They load in three tiers:
//! 1. Core extensions (`CSharp`, `MySql`, `SQLite`, ...)
//! 2. Game extensions (`Rust`, `Hurtworld`, ...)
//! 3. Everything else
//!
//! Legacy `Oxide.Core.*`, `Oxide.Ext.*` and `Oxide.Game.*` files are queued
//! for cleanup instead of loaded.
//!
//! # Example
//!
//! ```ignore
//! use oxide_core::extensions::ExtensionManager;
//!
//! let mut manager = ExtensionManager::with_native_loader();
//! manager.load_all_extensions(&extensions_dir);
//! manager.load_plugin_watchers(&plugins_dir);
//!
//! manager.reload_extension(&extensions_dir.join("Oxide.Discord.dll"));
//! ```

mod builtins;
mod cleanup;
mod diagnostics;
mod discovery;
mod error;
mod loader;
mod manager;
mod set;

pub use builtins::{PERMISSION_LIBRARY, Permission, TIMER_LIBRARY, Timer};
pub use cleanup::CleanupQueue;
pub use diagnostics::{DiagnosticSink, ExceptionReport, MemorySink, NullSink};
pub use discovery::{
    CORE_EXTENSIONS, GAME_EXTENSIONS, IGNORED_MODULES, MODULE_PREFIX, MODULE_SUFFIX, ScanResult,
    Tier, classify, derive_extension_name, is_module_file_name, scan_directory,
};
pub use error::{ErrorKind, ExtensionManagerError};
pub use loader::{MappedModule, ModuleLoader, NativeModuleLoader, StaticModuleLoader};
pub use manager::{ExtensionManager, ScanReport};
pub use set::{ExtensionFlags, ExtensionInfo, ExtensionSet, LoadedExtension};
