//! Leadgrid application shell
//!
//! This is the thin command-line shell that loads configuration, opens the
//! list store and dispatches commands. Core logic lives in the `crates/`
//! directory.

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

pub use cli::{Cli, Command};
pub use error::CommandError;
pub use state::AppState;

use anyhow::Context;
use leadgrid_core::AppConfig;
use std::io::Write;
use std::process::ExitCode;
use tracing::info;

/// Initialize tracing subscriber for logging
///
/// Logs go to stderr so stdout carries only command output.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,leadgrid=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load configuration, open the store and run the parsed command.
///
/// Command failures are reported as a JSON `CommandError` line on stderr.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    info!("Starting Leadgrid v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_with_env().context("failed to load configuration")?;
    if let Some(dir) = cli.lists_dir {
        config.storage.lists_dir = Some(dir);
    }

    let state = AppState::new(config)
        .await
        .context("failed to open the lists directory")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli::execute(&state, cli.command, &mut out).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(err) => {
            tracing::debug!("command failed: {}", err);
            let mut stderr = std::io::stderr().lock();
            serde_json::to_writer(&mut stderr, &err)?;
            writeln!(stderr)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
    }
}
