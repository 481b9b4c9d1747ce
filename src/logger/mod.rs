//! Console logger based on `tracing-subscriber`
//!
//! Supports Full, Compact and JSON line formats, with ANSI colors enabled
//! only when stdout is a terminal.

pub mod config;
pub mod error;

pub use self::config::{LogFormat, LoggerConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Subscriber for the window before settings are loaded.
///
/// Writes warnings and errors to stderr, so problems found while reading the
/// configuration itself are not lost. Use with
/// [`tracing::subscriber::with_default`].
pub fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    bootstrap_subscriber_with_writer(std::io::stderr)
}

fn bootstrap_subscriber_with_writer<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish()
}

/// Install the global subscriber for `config`.
///
/// Fails if the configuration is invalid or a subscriber is already set.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    let filter = config.filter()?;
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(use_ansi).with_target(true))
            .try_init()
            .map_err(LoggerError::from)?,
        LogFormat::Compact => registry
            .with(fmt::layer().with_ansi(use_ansi).with_target(true).compact())
            .try_init()
            .map_err(LoggerError::from)?,
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json())
            .try_init()
            .map_err(LoggerError::from)?,
    }

    Ok(())
}
