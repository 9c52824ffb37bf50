//! XDG Base Directory paths for oxide.
//!
//! The host resolves its config file and its default extension and plugin
//! directories through these helpers so every entry point agrees on layout.

use std::path::PathBuf;

/// Get the oxide config directory.
///
/// Returns `$XDG_CONFIG_HOME/oxide` if set, otherwise `~/.config/oxide`.
///
/// # Examples
///
/// ```
/// use oxide_paths::config_dir;
///
/// let config_file = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("oxide")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/oxide")
    } else {
        PathBuf::from(".config/oxide")
    }
}

/// Get the oxide data directory.
///
/// Returns `$XDG_DATA_HOME/oxide` if set, otherwise `~/.local/share/oxide`.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("oxide")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/oxide")
    } else {
        PathBuf::from(".local/share/oxide")
    }
}

/// Default directory scanned for `Oxide.*.dll` extension modules.
pub fn extensions_dir() -> PathBuf {
    data_dir().join("extensions")
}

/// Default directory handed to extensions for their plugin watchers.
pub fn plugins_dir() -> PathBuf {
    data_dir().join("plugins")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_ends_with_oxide() {
        let path = config_dir();
        assert!(path.ends_with("oxide"), "config_dir should end with 'oxide'");
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        let path = config_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-config/oxide"));
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_extension_and_plugin_dirs_live_under_data_dir() {
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
        }
        assert_eq!(
            extensions_dir(),
            PathBuf::from("/tmp/test-data/oxide/extensions")
        );
        assert_eq!(plugins_dir(), PathBuf::from("/tmp/test-data/oxide/plugins"));
        unsafe {
            std::env::remove_var("XDG_DATA_HOME");
        }
    }
}
