//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output in Full, Compact or JSON format

pub mod config;
pub mod error;
pub(crate) mod writer;


// Re-export main types
pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::LogFileWriter;

/// Build the event filter
///
/// `RUST_LOG` wins over the configured level so a single run can be
/// debugged without editing configuration.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = build_filter(&config.level);

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter)?,
        (true, false) => init_console_only(&config.console, filter)?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => anyhow::bail!("At least one output (console or file) must be enabled"),
    }

    Ok(())
}

fn console_ansi(config: &ConsoleConfig) -> bool {
    config.colored && std::io::stderr().is_terminal()
}

/// Console layer for any subscriber stack it is added to
fn console_layer<S>(ansi: bool) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(console_ansi(config)))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    file_subscriber(config, filter)?
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    combined_subscriber(config, filter)?
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

pub(crate) fn file_subscriber(
    config: &FileConfig,
    filter: EnvFilter,
) -> Result<BoxedSubscriber, LoggerError> {
    let writer = LogFileWriter::new(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let subscriber: BoxedSubscriber = match config.format {
        LogFormat::Full => Box::new(
            registry.with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer)),
        ),
        LogFormat::Compact => Box::new(
            registry.with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            ),
        ),
        LogFormat::Json => {
            Box::new(registry.with(fmt::layer().with_ansi(false).json().with_writer(writer)))
        }
    };

    Ok(subscriber)
}

/// File and console output together
///
/// The file layer goes first; otherwise span fields pick up the console
/// layer's ANSI codes (tokio-rs/tracing#1817). The console layer is built
/// per arm since its type depends on the stack beneath it.
pub(crate) fn combined_subscriber(
    config: &LoggerConfig,
    filter: EnvFilter,
) -> Result<BoxedSubscriber, LoggerError> {
    let writer = LogFileWriter::new(&config.file)?;
    let ansi = console_ansi(&config.console);
    let registry = tracing_subscriber::registry().with(filter);

    let subscriber: BoxedSubscriber = match config.file.format {
        LogFormat::Full => Box::new(
            registry
                .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
                .with(console_layer(ansi)),
        ),
        LogFormat::Compact => Box::new(
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .compact()
                        .with_writer(writer),
                )
                .with(console_layer(ansi)),
        ),
        LogFormat::Json => Box::new(
            registry
                .with(fmt::layer().with_ansi(false).json().with_writer(writer))
                .with(console_layer(ansi)),
        ),
    };

    Ok(subscriber)
}
