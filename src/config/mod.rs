//! Configuration module for avail_cpus.
//!
//! All settings come from environment variables; none are required.
//!
//! # Example
//!
//! ```rust,ignore
//! use avail_cpus::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Mount table: {}", config.sources.mountinfo.display());
//! println!("Diagnostics: {}", config.logging.debug);
//! ```

mod error;
mod logging;
mod parse;
mod sources;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, DEBUG_ENV};
pub use sources::SourceConfig;

/// Complete configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Source file locations.
    pub sources: SourceConfig,
    /// Diagnostic logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sources: SourceConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::debug;

        debug!("Configuration loaded:");
        debug!("  Mount table: {}", self.sources.mountinfo.display());
        debug!("  cgroup membership: {}", self.sources.cgroup.display());
        debug!("  Log format: {}", self.logging.format);
    }
}
