use clap::Parser;
use gridplay_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod common;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    let result = match &cli.command {
        Commands::Solve {
            source,
            solver,
            format,
            action_file,
            parallel,
        } => commands::solve::handle(source, *solver, *format, action_file.as_deref(), *parallel),
        Commands::Islands { source } => commands::islands::handle(source),
        Commands::Balance { source } => commands::balance::handle(source),
        Commands::Presets => commands::presets::handle(),
    };

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
