//! CLI commands
//!
//! Every command boots a host the same way: scan the extension directory,
//! load what it finds, and shut down cleanly when the command is done.

pub mod lifecycle;
pub mod list;
pub mod load;
pub mod watch;

use std::path::{Path, PathBuf};

use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use oxide_core::{ExtensionInfo, ExtensionManager, ScanReport};

use crate::config::OxideConfig;

/// Arguments shared by every command that boots a host
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Extension directory (overrides `extensions.directory`)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl HostArgs {
    pub fn extension_dir(&self, config: &OxideConfig) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| config.extensions.directory.clone())
    }
}

/// Create a native host and load every extension in `dir`
pub fn start_host(dir: &Path) -> (ExtensionManager, ScanReport) {
    let mut manager = ExtensionManager::with_native_loader();
    let report = manager.load_all_extensions(dir);
    tracing::debug!(
        dir = %dir.display(),
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        stale = report.cleanup.len(),
        "Extension scan complete"
    );
    (manager, report)
}

/// Notify extensions of shutdown and delete stale modules if configured
pub fn stop_host(manager: &mut ExtensionManager, config: &OxideConfig) {
    manager.shutdown();
    if config.extensions.run_cleanup && !manager.cleanup_queue().is_empty() {
        let removed = manager.run_cleanup();
        tracing::info!(removed, "Removed stale extension modules");
    }
}

/// Render loaded extensions as a table
pub fn extension_table(infos: &[ExtensionInfo]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Version").fg(Color::Cyan),
        Cell::new("Author").fg(Color::Cyan),
        Cell::new("Kind").fg(Color::Cyan),
        Cell::new("Path").fg(Color::Cyan),
    ]);

    for info in infos {
        table.add_row(vec![
            Cell::new(&info.name),
            Cell::new(info.display_version()),
            Cell::new(&info.author),
            Cell::new(kind_label(info)),
            Cell::new(info.path.display()),
        ]);
    }

    table
}

fn kind_label(info: &ExtensionInfo) -> &'static str {
    if info.is_core_extension {
        "core"
    } else if info.is_game_extension {
        "game"
    } else if info.supports_reloading {
        "reloadable"
    } else {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_ext_api::VersionNumber;

    fn info(name: &str, core: bool, reloadable: bool) -> ExtensionInfo {
        ExtensionInfo {
            name: name.to_string(),
            version: VersionNumber::new(2, 1, 0),
            branch: "develop".to_string(),
            author: "Oxide".to_string(),
            path: PathBuf::from(format!("/ext/Oxide.{}.dll", name)),
            is_core_extension: core,
            is_game_extension: false,
            supports_reloading: reloadable,
            loaded_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_extension_dir_prefers_flag() {
        let config = OxideConfig::default();
        let args = HostArgs {
            dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(args.extension_dir(&config), PathBuf::from("/custom"));
        assert_eq!(
            HostArgs::default().extension_dir(&config),
            config.extensions.directory
        );
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(kind_label(&info("Lua", true, false)), "core");
        assert_eq!(kind_label(&info("Discord", false, true)), "reloadable");
        assert_eq!(kind_label(&info("Pinned", false, false)), "fixed");
    }

    #[test]
    fn test_table_shows_branch_version() {
        let rendered = extension_table(&[info("Discord", false, true)]).to_string();
        assert!(rendered.contains("Discord"));
        assert!(rendered.contains("2.1.0@develop"));
    }
}
