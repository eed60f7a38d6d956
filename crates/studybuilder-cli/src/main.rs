//! StudyBuilder CLI - command-line access to the StudyBuilder API
//!
//! This is the main entry point of the `studybuilder` binary. Every command
//! that talks to the backend goes through the core gateway; notifications
//! the calls raise are printed to stderr before the process exits.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use handlers::Connection;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::{instrument, Instrument};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    // Loaded before parsing so clap's `env` fallbacks see `.env` values too
    let _ = dotenv::dotenv();
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Held until exit so buffered file logs are flushed
    let log_guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

        if e.should_show_help() {
            eprintln!("\nFor more information, try '--help'");
        }

        drop(log_guard);
        process::exit(e.exit_code());
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    let timer = Timer::new("cli_execution");

    let config = {
        let _config_timer = Timer::new("config_loading");
        Config::load_with_file(cli.config.as_deref())?
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet, config.output.progress);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    let connection = Connection {
        base_url: cli.base_url,
        token: cli.token,
        study_version: cli.study_version,
        locale: cli.locale,
    };

    let command = match cli.command {
        Commands::Config(args) => return handlers::handle_config(args, &config, &mut output).await,
        Commands::Completions(args) => return handlers::handle_completions(args),
        command => command,
    };

    let gateway = handlers::connect(&connection, &config)?;
    let result = async {
        match command {
            Commands::Get(args) => handlers::handle_get(args, &gateway, &mut output).await,
            Commands::Crfs(args) => handlers::handle_crfs(args, &gateway, &mut output).await,
            Commands::Suppliers(args) => handlers::handle_suppliers(args, &gateway, &mut output).await,
            Commands::Config(_) | Commands::Completions(_) => Ok(()),
        }
    }
    .instrument(timer.span().clone())
    .await;

    output.notifications(&gateway.notifications().snapshot())?;
    result
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    // Only the logging section matters here; `run` loads the config again
    if let Ok(config) = Config::load_with_file(cli.config.as_deref()) {
        logging_config.merge_with_settings(&config.logging, cli.verbosity_level());
    }

    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
