//! CLI entry point.
//!
//! # Responsibility
//! - Without arguments: print core ping/version for linkage checks.
//! - With a snapshot path: print the portfolio CSV report to stdout.

use hotelfin_core::{
    init_logging_from_config, render_portfolio_report, CoreConfig, LedgerSnapshot,
    TransactionFilter,
};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error");
            eprintln!("hotelfin_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    let Some(path) = std::env::args().nth(1) else {
        println!("hotelfin_core ping={}", hotelfin_core::ping());
        println!("hotelfin_core version={}", hotelfin_core::core_version());
        return Ok(());
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|err| format!("failed to read snapshot `{path}`: {err}"))?;
    let snapshot = LedgerSnapshot::from_json(&text).map_err(|err| err.to_string())?;
    let report = render_portfolio_report(&snapshot, &TransactionFilter::default())
        .map_err(|err| err.to_string())?;

    info!(
        "event=cli_report module=cli status=ok transactions={}",
        snapshot.transactions.len()
    );
    print!("{report}");
    Ok(())
}
