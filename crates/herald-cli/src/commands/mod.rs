//! CLI surface (§6 External Interfaces): `heraldd run`, `heraldd check`,
//! `heraldd completions <shell>`.

pub mod check;
pub mod completions;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "heraldd", about = "Anycast health-driven BGP speaker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the daemon: load config, start the BGP speaker, and drive every
    /// configured prefix's control loop until signalled to stop.
    Run(run::RunArgs),
    /// Parse and validate the configuration file without starting anything.
    Check(check::CheckArgs),
    /// Generate shell completion scripts.
    Completions(completions::CompletionArgs),
}
