//! Extension manager error types

use std::path::PathBuf;
use thiserror::Error;

use oxide_ext_api::ExtensionError;

/// Errors that can occur while managing extensions
#[derive(Error, Debug)]
pub enum ExtensionManagerError {
    /// An extension with this exact path is already loaded
    #[error("Extension at {path} is already loaded")]
    AlreadyLoaded { path: PathBuf },

    /// No extension is loaded from this path
    #[error("No extension loaded from {path}")]
    NotLoaded { path: PathBuf },

    /// The module could not be mapped into the process
    #[error("Failed to map module {path}: {reason}")]
    MapError { path: PathBuf, reason: String },

    /// API version mismatch between host and module
    #[error("API version mismatch: oxide expects {expected}, module has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// The module exports no extension type
    #[error("Module {path} does not export an extension")]
    NoExtensionType { path: PathBuf },

    /// Core and game extensions cannot be unloaded or reloaded
    #[error("Extension '{name}' is a core or game extension and cannot be unloaded")]
    ProtectedExtension { name: String },

    /// The extension does not support unloading or reloading
    #[error("Extension '{name}' does not support reloading")]
    ReloadUnsupported { name: String },

    /// The extension's ConfigureServices hook failed (non-fatal)
    #[error("Extension '{name}' failed to configure services: {source}")]
    ConfigureServicesFailure {
        name: String,
        #[source]
        source: ExtensionError,
    },

    /// A lifecycle hook failed or panicked
    #[error("Extension '{name}' failed in {hook}: {message}")]
    LifecycleHookFailure {
        name: String,
        hook: &'static str,
        message: String,
    },

    /// Failed to load dynamic library
    #[error("Failed to load extension library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`ExtensionManagerError`], handy for log fields and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyLoaded,
    NotLoaded,
    MapError,
    NoExtensionType,
    ProtectedExtension,
    ReloadUnsupported,
    ConfigureServicesFailure,
    LifecycleHookFailure,
    Io,
}

impl ExtensionManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyLoaded { .. } => ErrorKind::AlreadyLoaded,
            Self::NotLoaded { .. } => ErrorKind::NotLoaded,
            Self::MapError { .. } | Self::ApiVersionMismatch { .. } | Self::LibraryLoad(_) => {
                ErrorKind::MapError
            }
            Self::NoExtensionType { .. } => ErrorKind::NoExtensionType,
            Self::ProtectedExtension { .. } => ErrorKind::ProtectedExtension,
            Self::ReloadUnsupported { .. } => ErrorKind::ReloadUnsupported,
            Self::ConfigureServicesFailure { .. } => ErrorKind::ConfigureServicesFailure,
            Self::LifecycleHookFailure { .. } => ErrorKind::LifecycleHookFailure,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Rejected preconditions are expected outcomes of a command; everything
    /// else is an exception and is forwarded to the diagnostic sink.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AlreadyLoaded
                | ErrorKind::NotLoaded
                | ErrorKind::ProtectedExtension
                | ErrorKind::ReloadUnsupported
        )
    }

    pub(crate) fn map_error(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MapError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn hook_failure(name: &str, hook: &'static str, message: impl ToString) -> Self {
        Self::LifecycleHookFailure {
            name: name.to_string(),
            hook,
            message: message.to_string(),
        }
    }
}
