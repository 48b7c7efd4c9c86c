//! avail_cpus - cgroup-aware CPU count for containerized processes.
//!
//! `num_cpus`-style counts report every logical CPU the kernel exposes. Inside
//! a container limited by a CFS quota (`docker run --cpus`, Kubernetes CPU
//! limits) that over-states what the process can use. This crate reads the
//! cgroup v1 quota of the current process and clamps the OS count to it, so
//! thread and worker pools are sized to the real allotment.
//!
//! # Features
//!
//! - **Mount discovery**: finds `cpu`, `cpuacct` and `memory` hierarchies in
//!   `/proc/self/mountinfo`, including co-mounted `cpu,cpuacct`
//! - **Path resolution**: maps `/proc/self/cgroup` onto the mounts, handling
//!   containers that only see a subtree of the hierarchy
//! - **Quota computation**: `ceil(cfs_quota_us / cfs_period_us)`, never more
//!   than the OS count, never less than 1
//! - **Diagnostics**: set `AVAIL_CPU_COUNT_DEBUG` to print intermediate values
//!   on stderr
//!
//! Non-Linux platforms get the OS count unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! let workers = avail_cpus::available_cpu_count();
//! let pool = ThreadPool::new(workers);
//! ```

use std::sync::OnceLock;

use crate::config::{ConfigError, LoggingConfig, SourceConfig};

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod logging;
pub mod system;

pub use config::Config;
pub use system::{CpuCounter, CpuReport, Subsystem};

/// Number of CPUs available to the current process. Always at least 1.
///
/// The first call reads the configuration from the environment and resolves
/// the cgroup paths; later calls reuse them and only re-read the quota files.
pub fn available_cpu_count() -> usize {
    process_counter().available()
}

/// Process-wide counter used by [`available_cpu_count`].
pub fn process_counter() -> &'static CpuCounter {
    static COUNTER: OnceLock<CpuCounter> = OnceLock::new();
    COUNTER.get_or_init(|| counter_from_env(load_config()))
}

/// Load each configuration section on its own, so a bad value in one
/// section leaves the others intact.
fn load_config() -> Config {
    let debug = LoggingConfig::debug_enabled();
    let report = |err: ConfigError| {
        if debug {
            eprintln!("avail_cpus: {}, using defaults", err);
        }
    };

    let sources = SourceConfig::from_env().unwrap_or_else(|err| {
        report(err);
        SourceConfig::default()
    });
    let logging = LoggingConfig::from_env().unwrap_or_else(|err| {
        report(err);
        LoggingConfig {
            debug,
            ..Default::default()
        }
    });

    Config { sources, logging }
}

fn counter_from_env(config: Config) -> CpuCounter {
    logging::init_diagnostics(&config.logging);
    if config.logging.debug {
        config.log_summary();
    }

    CpuCounter::new()
        .with_paths(config.sources.cgroup_paths())
        .with_diagnostics(config.logging.debug)
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
