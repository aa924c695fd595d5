//! `heraldd completions <shell>`: print a shell completion script to stdout.

use std::io;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::commands::Cli;
use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionArgs) -> CliResult<()> {
    let mut cli = Cli::command();
    let name = cli.get_name().to_string();
    generate(args.shell, &mut cli, name, &mut io::stdout());
    Ok(())
}
