//! `heraldd check`: parse and validate the configuration file, then exit.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the YAML configuration file.
    #[arg(long, env = "HERALD_CONFIG")]
    pub config: PathBuf,
}

pub fn execute(args: CheckArgs) -> CliResult<()> {
    let config = herald_core::Config::load(&args.config)?;
    println!(
        "configuration OK: {} neighbor(s), {} prefix(es)",
        config.neighbors.len(),
        config.prefixes.len()
    );
    Ok(())
}
