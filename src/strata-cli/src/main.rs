//! Strata CLI - main entry point.

use clap::Parser;

use strata_cli::cli::{Cli, Commands, RegistryCommands, StreamsCommands};
use strata_cli::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Login(args) => commands::login::run(args).await,
        Commands::Logout => commands::logout::run().await,
        Commands::Whoami => commands::whoami::run(),
        Commands::Status => commands::status::run(),
        Commands::Streams { command } => match command {
            StreamsCommands::List => commands::streams::list().await,
            StreamsCommands::Topics { id } => commands::streams::topics(&id).await,
        },
        Commands::Registry { command } => match command {
            RegistryCommands::List => commands::registry::list().await,
        },
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

/// Route tracing output to stderr so stdout stays parseable.
/// `STRATA_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("STRATA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
