//! Structured diagnostics for the tobiko binary.
//!
//! The binary configures logging exactly once, before doing anything else:
//! events go to stderr so the CSV payload on stdout stays machine-readable,
//! `RUST_LOG` selects the filter (default `info`), and `TOBIKO_LOG_FORMAT`
//! picks a [`LogFormat`]. The `log` facade is bridged so records from
//! dependencies flow through the same subscriber.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "TOBIKO_LOG_FORMAT";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Output encodings supported by the diagnostics stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Line-oriented output for terminals.
    #[default]
    Human,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while configuring the diagnostics stream.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `TOBIKO_LOG_FORMAT` held something other than `human` or `json`.
    #[error("`{provided}` is not a log format; use `human` or `json`")]
    UnsupportedFormat {
        /// The rejected value, lowercased and trimmed.
        provided: String,
    },
}

/// Configure the process-wide diagnostics stream once.
///
/// Repeated calls are no-ops, and losing the race for the global subscriber
/// slot (a test harness or embedding application got there first) is treated
/// the same way: the existing configuration wins.
///
/// # Errors
/// Returns [`LoggingError::UnsupportedFormat`] when `TOBIKO_LOG_FORMAT` holds
/// a value this binary does not understand.
pub fn init_logging() -> Result<(), LoggingError> {
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse()?,
        Err(_) => LogFormat::default(),
    };
    INSTALLED.get_or_init(|| install(format));
    Ok(())
}

fn install(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let events = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let events = match format {
        LogFormat::Human => events.boxed(),
        LogFormat::Json => events.json().with_current_span(true).boxed(),
    };

    // Both installs are best-effort: an occupied global slot means another
    // subscriber is already handling the process.
    let _ = LogTracer::init();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(events)
        .try_init();
}
