use std::io::IsTerminal;

use booking_core::models::Record;
use booking_core::settings::Settings;
use booking_data::reader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` value onto a [`tracing_subscriber::EnvFilter`] directive.
///
/// Unrecognised levels pass through unchanged so that full filter directives
/// (e.g. `booking_data=trace`) also work.
pub fn filter_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr; stdout is reserved for the statistics JSON.
/// Falls back to `"warn"` if the level string is not a valid directive.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Input ──────────────────────────────────────────────────────────────────────

/// Load the records named by `--input`, or stdin for `-`.
pub fn load_input(settings: &Settings) -> anyhow::Result<Vec<Record>> {
    let records = if settings.reads_stdin() {
        tracing::debug!("reading records from stdin");
        reader::read_records(std::io::stdin().lock())?
    } else {
        tracing::debug!("reading records from {}", settings.input.display());
        reader::load_records(&settings.input)?
    };
    Ok(records)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
