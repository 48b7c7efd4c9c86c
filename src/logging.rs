//! Diagnostic output on stderr.
//!
//! Nothing is installed unless `AVAIL_CPU_COUNT_DEBUG` is set. When it is,
//! a global `tracing` subscriber writing to stderr is installed, either as
//! plain text or one JSON object per line:
//!
//! ```json
//! {"timestamp":"2024-12-28T15:04:05.123Z","level":"DEBUG","fields":{"message":"cpu quota & period","quota":"Some(200000)","period":"Some(100000)"},"target":"avail_cpus::diagnostics"}
//! ```
//!
//! `LOG_LEVEL` / `RUST_LOG` tune everything else; diagnostic events are
//! always let through while the toggle is on.

use std::io::{self, IsTerminal};

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::system::DIAGNOSTICS_TARGET;

/// Fallback filter when the configured one does not parse.
const DEFAULT_FILTER: &str = "avail_cpus=debug";

/// Install the diagnostic subscriber if diagnostics are enabled.
///
/// Returns `true` if a subscriber was installed. This sets the process-wide
/// default subscriber; an application that already set one keeps it, and the
/// diagnostic events go through its filter instead.
pub fn init_diagnostics(config: &LoggingConfig) -> bool {
    if !config.debug {
        return false;
    }

    let ansi = io::stderr().is_terminal();
    diagnostics_subscriber(config, io::stderr, ansi)
        .try_init()
        .is_ok()
}

/// Subscriber used for diagnostic output, writing through `writer`.
pub fn diagnostics_subscriber<W>(
    config: &LoggingConfig,
    writer: W,
    ansi: bool,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = build_filter(&config.filter);
    match config.format {
        LogFormat::Json => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer)),
        ),
        LogFormat::Text => Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(ansi).with_writer(writer)),
        ),
    }
}

/// Parse `directives` and force the diagnostics target on at debug level.
fn build_filter(directives: &str) -> EnvFilter {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|err| {
        eprintln!(
            "Warning: Invalid log filter '{}' ({}), using {}",
            directives, err, DEFAULT_FILTER
        );
        EnvFilter::new(DEFAULT_FILTER)
    });

    match format!("{}=debug", DIAGNOSTICS_TARGET).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
