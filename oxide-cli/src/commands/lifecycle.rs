//! `oxide reload` and `oxide unload`
//!
//! Both operations are fire-and-forget; the outcome is read back from the
//! extension set afterwards.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use oxide_core::ExtensionManager;

use super::{HostArgs, start_host, stop_host};
use crate::config::OxideConfig;

#[derive(Args, Debug)]
pub struct ModuleArgs {
    /// Module file, either a path or a file name inside the extension directory
    pub file: PathBuf,

    #[command(flatten)]
    pub host: HostArgs,
}

/// Resolve a bare file name against the extension directory
pub fn resolve_module(file: &Path, dir: &Path) -> PathBuf {
    if file.components().count() == 1 {
        dir.join(file)
    } else {
        file.to_path_buf()
    }
}

pub fn reload(args: ModuleArgs, config: &OxideConfig) -> Result<()> {
    run_operation(args, config, "reload", |manager, path| {
        manager.reload_extension(path)
    })
}

pub fn unload(args: ModuleArgs, config: &OxideConfig) -> Result<()> {
    run_operation(args, config, "unload", |manager, path| {
        manager.unload_extension(path)
    })
}

fn run_operation<F>(args: ModuleArgs, config: &OxideConfig, operation: &str, op: F) -> Result<()>
where
    F: FnOnce(&mut ExtensionManager, &Path),
{
    let dir = args.host.extension_dir(config);
    let path = resolve_module(&args.file, &dir);
    let (mut manager, _) = start_host(&dir);

    let before = manager.extensions().contains_path(&path);
    op(&mut manager, &path);
    let after = manager.extensions().contains_path(&path);

    println!("{}", describe(operation, &path, before, after));

    stop_host(&mut manager, config);
    Ok(())
}

fn describe(operation: &str, path: &Path, before: bool, after: bool) -> String {
    let state = match (before, after) {
        (_, true) if operation == "reload" => "loaded",
        (true, true) => "still loaded",
        (true, false) => "unloaded",
        (false, true) => "loaded",
        (false, false) => "not loaded",
    };
    format!("{} {}: {}", operation, path.display(), state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bare_file_name() {
        let dir = Path::new("/srv/oxide/extensions");
        assert_eq!(
            resolve_module(Path::new("Oxide.Discord.dll"), dir),
            PathBuf::from("/srv/oxide/extensions/Oxide.Discord.dll")
        );
        assert_eq!(
            resolve_module(Path::new("/other/Oxide.Discord.dll"), dir),
            PathBuf::from("/other/Oxide.Discord.dll")
        );
    }

    #[test]
    fn test_describe_outcomes() {
        let path = Path::new("/ext/Oxide.Rust.dll");
        assert_eq!(
            describe("unload", path, true, true),
            "unload /ext/Oxide.Rust.dll: still loaded"
        );
        assert_eq!(
            describe("unload", path, true, false),
            "unload /ext/Oxide.Rust.dll: unloaded"
        );
        assert_eq!(
            describe("reload", path, true, true),
            "reload /ext/Oxide.Rust.dll: loaded"
        );
        assert_eq!(
            describe("reload", path, true, false),
            "reload /ext/Oxide.Rust.dll: unloaded"
        );
    }
}
