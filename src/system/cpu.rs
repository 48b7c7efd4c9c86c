//! Effective CPU count for the current process.
//!
//! The OS reports every logical CPU it can schedule on, but a container may
//! be throttled to a fraction of them by a CFS quota. [`CpuCounter`] reads
//! the quota through the resolved `cpu` cgroup path and clamps the OS count
//! to it.

use std::sync::Arc;

use tracing::debug;

use super::cgroup::CgroupPaths;
use super::fs::{HostFs, ProcFs};
use super::quota::{
    read_control_value, ControlReadError, CpuReport, CPU_CFS_PERIOD_US, CPU_CFS_QUOTA_US,
    CPU_SHARES,
};
use super::subsystem::Subsystem;

/// Target of diagnostic events, enabled by `AVAIL_CPU_COUNT_DEBUG`.
pub const DIAGNOSTICS_TARGET: &str = "avail_cpus::diagnostics";

/// Operating system family, as far as cgroup handling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// cgroup files are consulted.
    Linux,
    /// Anything else; the OS count is used as is.
    Other,
}

impl Platform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Computes the number of CPUs the process may actually use.
///
/// Holds its own [`CgroupPaths`] cache, so two counters never share state.
pub struct CpuCounter {
    fs: Arc<dyn ProcFs>,
    paths: CgroupPaths,
    platform: Platform,
    logical_cpus: Option<usize>,
    diagnostics: bool,
}

impl CpuCounter {
    /// Counter for the current process on the host filesystem.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(HostFs),
            paths: CgroupPaths::from_proc(),
            platform: Platform::current(),
            logical_cpus: None,
            diagnostics: false,
        }
    }

    /// Read pseudo-files through `fs`.
    pub fn with_fs(mut self, fs: Arc<dyn ProcFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Use a different (unpopulated) path cache.
    pub fn with_paths(mut self, paths: CgroupPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Override platform detection.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Fix the OS CPU count instead of querying it.
    pub fn with_logical_cpus(mut self, count: usize) -> Self {
        self.logical_cpus = Some(count);
        self
    }

    /// Emit intermediate values as diagnostic events.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// The path cache backing this counter.
    pub fn paths(&self) -> &CgroupPaths {
        &self.paths
    }

    /// Platform the counter evaluates for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Logical CPUs reported by the OS, at least 1.
    pub fn raw_count(&self) -> usize {
        self.logical_cpus.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Read an integer control file of `subsystem`.
    pub fn read_control_value(
        &self,
        subsystem: Subsystem,
        file: &str,
    ) -> Result<i64, ControlReadError> {
        read_control_value(self.fs.as_ref(), &self.paths, subsystem, file)
    }

    /// Number of CPUs available to the process. Always at least 1.
    pub fn available(&self) -> usize {
        self.report().available
    }

    /// Compute the CPU count along with every input that produced it.
    pub fn report(&self) -> CpuReport {
        let raw_count = self.raw_count();

        if self.platform != Platform::Linux {
            return CpuReport::unrestricted(raw_count);
        }

        let cpu_shares = self.cpu_value(CPU_SHARES);
        if self.diagnostics {
            debug!(target: DIAGNOSTICS_TARGET, cpu_shares = ?cpu_shares, "cpuShares");
        }

        let quota = self.cpu_value(CPU_CFS_QUOTA_US);
        let period = self.cpu_value(CPU_CFS_PERIOD_US);
        if self.diagnostics {
            debug!(target: DIAGNOSTICS_TARGET, quota = ?quota, period = ?period, "cpu quota & period");
        }

        let report = CpuReport::compute(raw_count, cpu_shares, quota, period);
        if self.diagnostics {
            debug!(
                target: DIAGNOSTICS_TARGET,
                raw_count = report.raw_count,
                share_count = report.share_count,
                quota_count = report.quota_count,
                available = report.available,
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "CPU quota: {}",
                report.cpu_quota_display()
            );
        }
        report
    }

    /// Read a `cpu` subsystem value, collapsing failures to unknown.
    fn cpu_value(&self, file: &str) -> Option<i64> {
        match self.read_control_value(Subsystem::Cpu, file) {
            Ok(value) => Some(value),
            Err(err) => {
                if self.diagnostics {
                    debug!(target: DIAGNOSTICS_TARGET, "{}", err);
                }
                None
            }
        }
    }
}

impl Default for CpuCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCounter")
            .field("paths", &self.paths)
            .field("platform", &self.platform)
            .field("logical_cpus", &self.logical_cpus)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
