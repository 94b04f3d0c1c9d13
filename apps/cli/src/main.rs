//! Kiln CLI - drive an Azure OpenAI fine-tuning pipeline end to end.
//!
//! Uploads the training and validation datasets, submits a fine-tuning job,
//! waits for it, deploys the resulting model, waits for the deployment, then
//! asks the deployed model the configured question.

mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Kiln - fine-tune, deploy, and try out a custom Azure OpenAI model
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    author,
    version,
    about = "Kiln - Azure OpenAI fine-tuning pipeline",
    long_about = "Kiln drives the Azure OpenAI fine-tuning workflow end to end:\ndataset upload, training, deployment, and a first inference call."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Path to a TOML configuration file (defaults to ./kiln.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: upload, train, deploy, infer
    ///
    /// Every stage feeds the next; training and deployment are polled on a
    /// fixed interval and bounded by the configured attempt budget.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Run => commands::run::execute(args.config).await?,
    }

    Ok(())
}
