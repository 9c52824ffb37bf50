use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::{ConfigLoader, OxideConfig};

#[derive(Parser)]
#[command(name = "oxide", about = "Extension host for Oxide modules")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra config file layered over the user and project config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every extension in the extension directory and report the result
    Load(commands::load::LoadArgs),
    /// List loaded extensions
    List(commands::list::ListArgs),
    /// Reload one extension module
    Reload(commands::lifecycle::ModuleArgs),
    /// Unload one extension module
    Unload(commands::lifecycle::ModuleArgs),
    /// Reload extension modules as they change on disk
    Watch(commands::watch::WatchArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, &config))
        .init();

    match cli.command {
        Commands::Load(args) => commands::load::run(args, &config),
        Commands::List(args) => commands::list::run(args, &config),
        Commands::Reload(args) => commands::lifecycle::reload(args, &config),
        Commands::Unload(args) => commands::lifecycle::unload(args, &config),
        Commands::Watch(args) => commands::watch::run(args, &config),
    }
}

/// `--verbose` wins, then `RUST_LOG`, then `logging.level`
fn log_filter(verbose: bool, config: &OxideConfig) -> String {
    if verbose {
        return "debug".to_string();
    }
    std::env::var("RUST_LOG")
        .ok()
        .filter(|filter| !filter.is_empty())
        .unwrap_or_else(|| config.logging.level.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["oxide", "list", "--json", "--dir", "/srv/ext"]);
        match cli.command {
            Commands::List(args) => {
                assert!(args.json);
                assert_eq!(args.host.dir, Some(PathBuf::from("/srv/ext")));
            }
            _ => panic!("expected list"),
        }

        let cli = Cli::parse_from(["oxide", "-v", "reload", "Oxide.Discord.dll"]);
        assert!(cli.verbose);
        assert!(
            matches!(cli.command, Commands::Reload(args) if args.file == PathBuf::from("Oxide.Discord.dll"))
        );

        let cli = Cli::parse_from(["oxide", "watch", "--debounce-ms", "50", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Watch(args) if args.debounce_ms == Some(50)));
    }

    #[test]
    #[serial]
    fn test_log_filter_precedence() {
        let config = OxideConfig::default();
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(log_filter(true, &config), "debug");
        assert_eq!(log_filter(false, &config), "info");

        unsafe {
            std::env::set_var("RUST_LOG", "oxide_core=trace");
        }
        assert_eq!(log_filter(false, &config), "oxide_core=trace");
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
    }
}
