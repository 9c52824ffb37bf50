//! `oxide load` - boot a host, report what loaded, shut it down

use anyhow::Result;
use clap::Args;

use super::{HostArgs, extension_table, start_host, stop_host};
use crate::config::OxideConfig;

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub host: HostArgs,
}

pub fn run(args: LoadArgs, config: &OxideConfig) -> Result<()> {
    let dir = args.host.extension_dir(config);
    let (mut manager, report) = start_host(&dir);
    manager.load_plugin_watchers(&config.extensions.plugin_directory);

    let infos = manager.extension_infos();
    if infos.is_empty() {
        println!("No extensions loaded from {}", dir.display());
    } else {
        println!("{}", extension_table(&infos));
    }

    for (path, kind) in &report.failed {
        println!("Failed: {} ({:?})", path.display(), kind);
    }
    for path in &report.removed {
        println!("Removed after startup failure: {}", path.display());
    }
    if !report.cleanup.is_empty() {
        println!("{} stale module(s) queued for cleanup", report.cleanup.len());
    }

    let loaders = manager.plugin_loaders().len();
    let watchers = manager.plugin_change_watchers().len();
    println!(
        "{} extension(s), {} plugin loader(s), {} change watcher(s)",
        infos.len(),
        loaders,
        watchers
    );

    stop_host(&mut manager, config);
    Ok(())
}
