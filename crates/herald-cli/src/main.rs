use clap::Parser;
use herald_cli::commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => herald_cli::commands::run::execute(args).await,
        Commands::Check(args) => herald_cli::commands::check::execute(args),
        Commands::Completions(args) => herald_cli::commands::completions::execute(args),
    };

    if let Err(err) = result {
        eprintln!("heraldd: {err}");
        std::process::exit(1);
    }
}
