mod commands;
mod credentials;
mod table;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tagsweep_cloud::CloudError;
use tagsweep_config::ConfigError;

#[derive(Parser)]
#[command(name = "tagsweep")]
#[command(
    about = "Delete the AWS resources a cluster left behind, found by tag",
    long_about = None
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every resource tagged with a cluster id
    Cleanup(commands::cleanup::CleanupArgs),
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

/// 1 for problems found before talking to AWS, 2 for everything else
fn exit_code(err: &anyhow::Error) -> u8 {
    let precondition = err
        .downcast_ref::<CloudError>()
        .is_some_and(CloudError::is_precondition)
        || err.downcast_ref::<ConfigError>().is_some();
    if precondition { 1 } else { 2 }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version => {
            println!("tagsweep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Cleanup(args) => {
            let settings = tagsweep_config::load_settings()?;
            commands::cleanup::handle(args, &settings).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}
