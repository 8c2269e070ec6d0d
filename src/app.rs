/*
 * Responsibility
 * - .env → CLI → tracing → config, in that order
 * - Build the services for the selected command and run it once
 * - Print the token / warnings / errors and pick the exit code
 */
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::AppError;
use crate::output::Console;
use crate::services::DebugSink;
use crate::services::http::{DEFAULT_TIMEOUT, build_client};
use crate::services::jwks::{JwkResolver, KeySelection};
use crate::services::oauth::ResourceServerFlow;
use crate::services::token::{CustomTokenService, TokenSigner, TokenVerifier};

fn init_tracing(debug: bool) {
    // RUST_LOG wins; otherwise only warnings, or everything from this crate in debug mode.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "warn,jwt_mint=debug" } else { "warn" })
    });

    // stdout is reserved for the token
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn run() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let console = Console::new(!cli.no_color, cli.quiet);

    match execute(&cli, &console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            console.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli, console: &Console) -> Result<(), AppError> {
    let config = Config::load(&cli.config_file, cli.overrides())?;
    init_tracing(config.debug);
    tracing::debug!(command = ?cli.selected(), config = %cli.config_file.display(), "starting");

    let debug: Option<&dyn DebugSink> = config.debug.then_some(console as &dyn DebugSink);
    let http = build_client(DEFAULT_TIMEOUT)?;

    let token = match cli.selected() {
        Command::Custom => {
            let service = CustomTokenService::new(
                TokenSigner::new(),
                JwkResolver::new(http),
                TokenVerifier,
            );
            let minted = service.mint(&config.custom, debug)?;

            if let KeySelection::Fallback { requested } = &minted.key_selection {
                console.warning(&format!(
                    "could not find key with kid {requested}; verified with the first key of the set instead"
                ));
            }
            minted.token
        }
        Command::Rs => ResourceServerFlow::new(http).run(&config.rs, debug)?.access_token,
    };

    console.token(&token);
    Ok(())
}
