use super::types::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_LOG_LEVEL, ExtensionsConfig, LoggingConfig, OxideConfig,
    RawExtensionsConfig, RawLoggingConfig, RawOxideConfig, RawWatchConfig, WatchConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, then project, then `explicit`)
    pub fn load(explicit: Option<&Path>) -> Result<OxideConfig> {
        let mut layers = vec![Self::user_config_path(), Self::project_config_path()];
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            layers.push(path.to_path_buf());
        }
        Self::load_layers(&layers)
    }

    /// Merge every existing file in `layers`, later files winning
    pub fn load_layers(layers: &[PathBuf]) -> Result<OxideConfig> {
        let mut raw = RawOxideConfig::default();

        for path in layers {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let layer: RawOxideConfig = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded config layer");
            raw = Self::merge_raw(raw, layer);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        oxide_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with OXIDE_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("OXIDE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".oxide/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawOxideConfig, overlay: RawOxideConfig) -> RawOxideConfig {
        RawOxideConfig {
            extensions: RawExtensionsConfig {
                directory: overlay.extensions.directory.or(base.extensions.directory),
                plugin_directory: overlay
                    .extensions
                    .plugin_directory
                    .or(base.extensions.plugin_directory),
                run_cleanup: overlay.extensions.run_cleanup.or(base.extensions.run_cleanup),
            },
            watch: RawWatchConfig {
                debounce_ms: overlay.watch.debounce_ms.or(base.watch.debounce_ms),
            },
            logging: RawLoggingConfig {
                level: overlay.logging.level.or(base.logging.level),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawOxideConfig) -> OxideConfig {
        OxideConfig {
            extensions: ExtensionsConfig {
                directory: raw
                    .extensions
                    .directory
                    .unwrap_or_else(oxide_paths::extensions_dir),
                plugin_directory: raw
                    .extensions
                    .plugin_directory
                    .unwrap_or_else(oxide_paths::plugins_dir),
                run_cleanup: raw.extensions.run_cleanup.unwrap_or(true),
            },
            watch: WatchConfig {
                debounce_ms: raw.watch.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            },
            logging: LoggingConfig {
                level: raw
                    .logging
                    .level
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
        }
    }
}
