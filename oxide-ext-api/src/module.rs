//! Module export table - what a compiled extension module exposes to the host

use crate::error::ExtensionError;
use crate::services::ServiceRegistry;
use crate::{Extension, FromServices};

/// Constructs an extension, resolving constructor dependencies from the
/// service registry.
pub type ExtensionFactory = fn(&ServiceRegistry) -> Result<Box<dyn Extension>, ExtensionError>;

/// What an exported type can do for the host
#[derive(Clone, Copy)]
pub enum ExportKind {
    /// The type is an extension and can be constructed
    Extension(ExtensionFactory),
    /// Any other exported type (libraries, helpers); ignored by the host
    Other,
}

/// One exported type of a module, in declaration order
#[derive(Clone)]
pub struct ModuleExport {
    pub type_name: String,
    pub kind: ExportKind,
}

impl ModuleExport {
    /// Export entry for an extension type
    pub fn extension<E: Extension + FromServices + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<E>().to_string(),
            kind: ExportKind::Extension(construct::<E>),
        }
    }

    /// Export entry for a type that is not an extension
    pub fn other(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ExportKind::Other,
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.kind, ExportKind::Extension(_))
    }

    pub fn factory(&self) -> Option<ExtensionFactory> {
        match self.kind {
            ExportKind::Extension(factory) => Some(factory),
            ExportKind::Other => None,
        }
    }
}

impl std::fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleExport")
            .field("type_name", &self.type_name)
            .field("is_extension", &self.is_extension())
            .finish()
    }
}

/// Factory used by [`ModuleExport::extension`]
pub fn construct<E: Extension + FromServices + 'static>(
    services: &ServiceRegistry,
) -> Result<Box<dyn Extension>, ExtensionError> {
    Ok(Box::new(E::from_services(services)?))
}

/// Export extension types for dynamic loading.
///
/// Types are exported in the order given; the host constructs the first one.
///
/// # Usage
///
/// ```ignore
/// oxide_ext_api::export_extensions!(MyExtension);
/// ```
///
/// # Generated Functions
///
/// - `_oxide_extension_api_version()`: Returns the API version
/// - `_oxide_extension_exports()`: Returns the boxed export table
#[macro_export]
macro_rules! export_extensions {
    ($($extension_type:ty),+ $(,)?) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _oxide_extension_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn _oxide_extension_exports() -> *mut ::std::vec::Vec<$crate::ModuleExport> {
            let exports = ::std::vec![$($crate::ModuleExport::extension::<$extension_type>()),+];
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(exports))
        }
    };
}
