// Entrypoint for the console app.
// - Resolves the configuration once, prepares the data file and logging,
//   then hands the terminal to the session.
// - Any unrecovered error becomes one diagnostic line and a failure exit.

use anyhow::{Context, Result};
use finances_app::config::AppConfig;
use finances_app::session::{Session, SessionOutcome};
use finances_app::terminal::CrosstermTerminal;
use finances_app::{logger, storage};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<SessionOutcome> {
    let config = AppConfig::from_platform().context("Failed to locate application data")?;

    // the log file lives next to the data file
    let resolution = storage::resolve(&config).context("Failed to prepare user data file")?;
    logger::initialize(&config)?;

    let mut session = Session::new(&config, CrosstermTerminal::new());
    session.report(resolution)?;
    let outcome = session.run()?;
    log::info!("Session finished: {:?}", outcome);
    Ok(outcome)
}
