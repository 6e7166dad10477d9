mod cli;
mod commands;
mod config;
mod logging;
mod prompt;
mod time_utils;

use clap::Parser;
use cli::{Cli, Commands};
use prompt::PromptError;

/// Ctrl+C inside a prompt is a normal way out, not a failure.
fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PromptError>(),
        Some(PromptError::Interrupted)
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command(), "starting");

    let result = match cli.command() {
        Commands::Start => commands::start().await,
        Commands::Stop => commands::stop().await,
        Commands::List => commands::list().await,
        Commands::Edit => commands::edit().await,
        Commands::ConfigPath => commands::config_path(),
        Commands::Logout => commands::logout(),
    };

    match result {
        Ok(()) => {}
        Err(err) if is_interrupt(&err) => {
            tracing::info!("prompt closed by user");
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("An error occurred: {err:#}");
            std::process::exit(1);
        }
    }
}
