//! `oxide list` - print loaded extensions as a table or JSON

use anyhow::Result;
use clap::Args;

use super::{HostArgs, extension_table, start_host, stop_host};
use crate::config::OxideConfig;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs, config: &OxideConfig) -> Result<()> {
    let (mut manager, _) = start_host(&args.host.extension_dir(config));
    let infos = manager.extension_infos();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else if infos.is_empty() {
        println!("No extensions loaded");
    } else {
        println!("{}", extension_table(&infos));
    }

    stop_host(&mut manager, config);
    Ok(())
}
