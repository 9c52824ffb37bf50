//! Module loaders - map a module file into the process and list its exports

use libloading::{Library, Symbol};
use std::collections::HashMap;
use std::path::Path;

use oxide_ext_api::{API_VERSION, ModuleExport};

use super::error::ExtensionManagerError;

/// A module mapped into the process.
///
/// Keeps the backing library (if any) alive for as long as the module is
/// loaded; extensions constructed from its exports must be dropped first.
pub struct MappedModule {
    exports: Vec<ModuleExport>,
    _library: Option<Library>,
}

impl MappedModule {
    /// A module whose code is already part of the process
    pub fn new(exports: Vec<ModuleExport>) -> Self {
        Self {
            exports,
            _library: None,
        }
    }

    fn with_library(exports: Vec<ModuleExport>, library: Library) -> Self {
        Self {
            exports,
            _library: Some(library),
        }
    }

    /// Exported types in declaration order
    pub fn exports(&self) -> &[ModuleExport] {
        &self.exports
    }

    /// First exported extension type; later ones are ignored
    pub fn first_extension(&self) -> Option<&ModuleExport> {
        self.exports.iter().find(|export| export.is_extension())
    }

    pub fn extension_count(&self) -> usize {
        self.exports
            .iter()
            .filter(|export| export.is_extension())
            .count()
    }
}

/// Strategy for turning a module file into a [`MappedModule`]
pub trait ModuleLoader: Send {
    fn map(&mut self, path: &Path) -> Result<MappedModule, ExtensionManagerError>;
}

/// Loads native dynamic libraries built with `oxide_ext_api::export_extensions!`
#[derive(Debug, Default)]
pub struct NativeModuleLoader;

impl NativeModuleLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for NativeModuleLoader {
    fn map(&mut self, path: &Path) -> Result<MappedModule, ExtensionManagerError> {
        if !path.is_file() {
            return Err(ExtensionManagerError::map_error(path, "module file not found"));
        }

        // SAFETY: Modules in the extension directory are trusted to follow the
        // export contract generated by `export_extensions!`.
        let library = unsafe { Library::new(path)? };

        {
            // SAFETY: The symbol is generated by the export macro with this signature.
            let api_version_fn: Symbol<extern "C" fn() -> u32> =
                unsafe { library.get(b"_oxide_extension_api_version")? };

            let found = api_version_fn();
            if found != API_VERSION {
                return Err(ExtensionManagerError::ApiVersionMismatch {
                    expected: API_VERSION,
                    found,
                });
            }
        }

        let exports = {
            // SAFETY: The export table is a boxed Vec handed over to the host.
            let exports_fn: Symbol<extern "C" fn() -> *mut Vec<ModuleExport>> =
                unsafe { library.get(b"_oxide_extension_exports")? };

            let raw = exports_fn();
            if raw.is_null() {
                return Err(ExtensionManagerError::map_error(
                    path,
                    "export table is a null pointer",
                ));
            }
            unsafe { *Box::from_raw(raw) }
        };

        Ok(MappedModule::with_library(exports, library))
    }
}

/// In-process module table keyed by file name.
///
/// Serves statically linked extensions and lets the lifecycle be exercised
/// without building dynamic libraries.
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: HashMap<String, Vec<ModuleExport>>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `exports` available under `file_name` (for example `Oxide.Foo.dll`)
    pub fn register(&mut self, file_name: impl Into<String>, exports: Vec<ModuleExport>) {
        self.modules.insert(file_name.into(), exports);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_module(mut self, file_name: impl Into<String>, exports: Vec<ModuleExport>) -> Self {
        self.register(file_name, exports);
        self
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn map(&mut self, path: &Path) -> Result<MappedModule, ExtensionManagerError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ExtensionManagerError::map_error(path, "path has no file name"))?;

        self.modules
            .get(file_name)
            .map(|exports| MappedModule::new(exports.clone()))
            .ok_or_else(|| ExtensionManagerError::map_error(path, "module is not registered"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_mapped_module_first_extension_skips_other_exports() {
        fn never(
            _: &oxide_ext_api::ServiceRegistry,
        ) -> Result<Box<dyn oxide_ext_api::Extension>, oxide_ext_api::ExtensionError> {
            Err(oxide_ext_api::ExtensionError::custom("not constructed in this test"))
        }

        let module = MappedModule::new(vec![
            ModuleExport::other("Helpers"),
            ModuleExport {
                type_name: "First".to_string(),
                kind: oxide_ext_api::ExportKind::Extension(never),
            },
            ModuleExport {
                type_name: "Second".to_string(),
                kind: oxide_ext_api::ExportKind::Extension(never),
            },
        ]);

        assert_eq!(module.exports().len(), 3);
        assert_eq!(module.extension_count(), 2);
        assert_eq!(module.first_extension().unwrap().type_name, "First");
    }

    #[test]
    fn test_static_loader_unknown_module() {
        let mut loader = StaticModuleLoader::new();
        let err = loader.map(Path::new("/ext/Oxide.Missing.dll")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MapError);
    }

    #[test]
    fn test_static_loader_maps_by_file_name() {
        let mut loader =
            StaticModuleLoader::new().with_module("Oxide.Foo.dll", vec![ModuleExport::other("Foo")]);

        let module = loader.map(Path::new("/any/dir/Oxide.Foo.dll")).unwrap();
        assert_eq!(module.exports().len(), 1);
        assert!(module.first_extension().is_none());
    }

    #[test]
    fn test_native_loader_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut loader = NativeModuleLoader::new();
        let err = loader
            .map(&dir.path().join("Oxide.Nope.dll"))
            .err()
            .unwrap();
        assert!(matches!(err, ExtensionManagerError::MapError { .. }));
    }

    #[test]
    fn test_native_loader_rejects_non_library_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Oxide.Garbage.dll");
        std::fs::write(&path, b"definitely not a shared object").unwrap();

        let mut loader = NativeModuleLoader::new();
        let err = loader.map(&path).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MapError);
    }
}
