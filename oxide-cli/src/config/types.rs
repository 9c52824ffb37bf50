use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawOxideConfig {
    #[serde(default)]
    pub extensions: RawExtensionsConfig,

    #[serde(default)]
    pub watch: RawWatchConfig,

    #[serde(default)]
    pub logging: RawLoggingConfig,
}

/// Extension section as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawExtensionsConfig {
    /// Directory scanned for `Oxide.*.dll` modules
    pub directory: Option<PathBuf>,

    /// Directory handed to extensions for their plugin watchers
    pub plugin_directory: Option<PathBuf>,

    /// Delete stale legacy modules on shutdown
    pub run_cleanup: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWatchConfig {
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OxideConfig {
    #[serde(default)]
    pub extensions: ExtensionsConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    pub directory: PathBuf,
    pub plugin_directory: PathBuf,
    pub run_cleanup: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            directory: oxide_paths::extensions_dir(),
            plugin_directory: oxide_paths::plugins_dir(),
            run_cleanup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period before changed modules are reloaded
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when neither `--verbose` nor `RUST_LOG` is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Default debounce for `oxide watch`
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";
