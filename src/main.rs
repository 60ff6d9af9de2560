//! Clinic - patient and treatment management CLI
//!
//! Main entry point for the `clinic` command.

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clinic::cli::{Cli, Commands};
use clinic::commands;
use clinic::config::Config;
use clinic::error::{ClinicError, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Load configuration. The format (plain or JSON) is only known after
    // loading, so warnings raised while loading go to a plain stderr logger.
    let config_path = cli.config.as_str();
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, || Config::load(config_path, &cli));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose, config.logging.json);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e.downcast_ref::<ClinicError>(), Some(ClinicError::SessionEnded)) {
                // Already reported through the session event.
                tracing::debug!("Command aborted: {}", e);
            } else {
                eprintln!("{}", format!("Error: {:#}", e).red());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    config.validate()?;

    let client = commands::connect(&config)?;
    let mut events = client.session().subscribe();

    let result = match cli.command {
        Commands::Login { email, password } => {
            tracing::info!("Logging in as {}", email);
            commands::session::login(&client, email, password).await
        }
        Commands::Logout => commands::session::logout(&client),
        Commands::Whoami => commands::session::whoami(&client),
        Commands::Patients { command } => {
            commands::require_session(&client)?;
            commands::patients::run(&client, command, config.language).await
        }
        Commands::Treatments { command } => {
            commands::require_session(&client)?;
            commands::treatments::run(&client, command).await
        }
        Commands::Users { command } => {
            commands::require_session(&client)?;
            commands::users::run(&client, command).await
        }
        Commands::Issues { command } => {
            commands::require_session(&client)?;
            commands::issues::run(&client, command).await
        }
    };

    commands::report_session_events(&mut events);
    result
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_filter = if verbose { "clinic=debug" } else { "clinic=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

fn init_tracing(verbose: bool, json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
