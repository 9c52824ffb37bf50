//! ExtensionSet - the authoritative collection of loaded extensions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use oxide_ext_api::{Extension, VersionNumber};

use super::loader::MappedModule;

/// Capability flags captured once when the extension is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtensionFlags {
    pub is_core_extension: bool,
    pub is_game_extension: bool,
    pub supports_reloading: bool,
}

impl ExtensionFlags {
    pub fn of(extension: &dyn Extension) -> Self {
        Self {
            is_core_extension: extension.is_core_extension(),
            is_game_extension: extension.is_game_extension(),
            supports_reloading: extension.supports_reloading(),
        }
    }

    /// Core and game extensions stay loaded for the life of the process
    pub fn is_protected(&self) -> bool {
        self.is_core_extension || self.is_game_extension
    }
}

/// A loaded extension together with the module it came from
pub struct LoadedExtension {
    /// The extension instance; declared before `module` so it is dropped
    /// while the module code is still mapped
    instance: Box<dyn Extension>,
    flags: ExtensionFlags,
    path: PathBuf,
    loaded_at: DateTime<Utc>,
    module: MappedModule,
}

impl LoadedExtension {
    pub(crate) fn new(instance: Box<dyn Extension>, path: PathBuf, module: MappedModule) -> Self {
        Self {
            flags: ExtensionFlags::of(instance.as_ref()),
            instance,
            path,
            loaded_at: Utc::now(),
            module,
        }
    }

    /// Drop the extension instance and hand back the module it came from
    pub(crate) fn into_module(self) -> MappedModule {
        let Self { instance, module, .. } = self;
        drop(instance);
        module
    }

    pub fn flags(&self) -> ExtensionFlags {
        self.flags
    }

    pub fn name(&self) -> &str {
        self.instance.name()
    }

    /// Path of the module file this extension was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &dyn Extension {
        self.instance.as_ref()
    }

    pub(crate) fn extension_mut(&mut self) -> &mut dyn Extension {
        self.instance.as_mut()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn info(&self) -> ExtensionInfo {
        let ext = self.extension();
        ExtensionInfo {
            name: ext.name().to_string(),
            version: ext.version(),
            branch: ext.branch().to_string(),
            author: ext.author().to_string(),
            path: self.path.clone(),
            is_core_extension: self.flags.is_core_extension,
            is_game_extension: self.flags.is_game_extension,
            supports_reloading: self.flags.supports_reloading,
            loaded_at: self.loaded_at,
        }
    }
}

impl std::fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("name", &self.name())
            .field("path", &self.path)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Snapshot of a loaded extension
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: VersionNumber,
    pub branch: String,
    pub author: String,
    pub path: PathBuf,
    pub is_core_extension: bool,
    pub is_game_extension: bool,
    pub supports_reloading: bool,
    pub loaded_at: DateTime<Utc>,
}

impl ExtensionInfo {
    /// Version string with the `@branch` suffix for non-master builds
    pub fn display_version(&self) -> String {
        self.version.with_branch(&self.branch)
    }
}

/// Loaded extensions in load order, unique by path.
///
/// Names are not required to be unique; name lookups return the earliest
/// loaded match.
#[derive(Default)]
pub struct ExtensionSet {
    entries: Vec<LoadedExtension>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn get_by_path(&self, path: &Path) -> Option<&LoadedExtension> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub(crate) fn get_by_path_mut(&mut self, path: &Path) -> Option<&mut LoadedExtension> {
        self.entries.iter_mut().find(|e| e.path == path)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&LoadedExtension> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Add `entry` unless its path is already loaded, in which case the
    /// entry is handed back untouched.
    pub(crate) fn insert(&mut self, entry: LoadedExtension) -> Result<(), LoadedExtension> {
        if self.contains_path(&entry.path) {
            return Err(entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    pub(crate) fn remove_by_path(&mut self, path: &Path) -> Option<LoadedExtension> {
        let index = self.entries.iter().position(|e| e.path == path)?;
        Some(self.entries.remove(index))
    }

    /// Paths of all loaded extensions in load order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedExtension> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut LoadedExtension> {
        self.entries.iter_mut()
    }

    pub fn infos(&self) -> Vec<ExtensionInfo> {
        self.entries.iter().map(LoadedExtension::info).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for ExtensionSet {
    fn drop(&mut self) {
        // Every instance is dropped before the first module is unmapped
        let modules: Vec<MappedModule> = self
            .entries
            .drain(..)
            .map(LoadedExtension::into_module)
            .collect();
        drop(modules);
    }
}
