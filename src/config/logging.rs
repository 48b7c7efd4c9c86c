//! Diagnostic logging configuration.

use std::fmt;
use std::str::FromStr;

use super::parse::{env_parse, env_present};
use super::ConfigError;

/// Presence of this variable turns diagnostic output on.
pub const DEBUG_ENV: &str = "AVAIL_CPU_COUNT_DEBUG";

/// Output format of diagnostic events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}', expected: text, json", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Diagnostic mode: intermediate values go to stderr.
    pub debug: bool,
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Event format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            filter: "avail_cpus=debug".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: avail_cpus=trace
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            debug: Self::debug_enabled(),
            filter: Self::resolve_log_filter(),
            format: env_parse("LOG_FORMAT", LogFormat::Text)?,
        })
    }

    /// Whether diagnostic mode is requested (variable present, any value).
    pub fn debug_enabled() -> bool {
        env_present(DEBUG_ENV)
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (debug, since the filter
    /// only matters once diagnostics are on)
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("avail_cpus={}", level);
                }
                _ => {
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        "avail_cpus=debug".to_string()
    }
}
