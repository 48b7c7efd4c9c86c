//! CFS quota arithmetic and control file reads.
//!
//! cgroup v1 expresses a CPU limit as `cpu.cfs_quota_us` microseconds of
//! runtime per `cpu.cfs_period_us` microseconds; a quota of `-1` means
//! unlimited. `cpu.shares` is a relative weight where 1024 is one CPU.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use super::cgroup::CgroupPaths;
use super::fs::ProcFs;
use super::subsystem::Subsystem;

/// Relative CPU weight file.
pub const CPU_SHARES: &str = "cpu.shares";

/// CFS runtime per period, microseconds (`-1` = unlimited).
pub const CPU_CFS_QUOTA_US: &str = "cpu.cfs_quota_us";

/// CFS period, microseconds.
pub const CPU_CFS_PERIOD_US: &str = "cpu.cfs_period_us";

/// `cpu.shares` value corresponding to one full CPU.
pub const SHARES_PER_CPU: u64 = 1024;

/// Why a control value is unknown.
#[derive(Debug)]
pub enum ControlReadError {
    /// The subsystem's cgroup directory could not be resolved.
    Unresolved(Subsystem),
    /// The control file does not exist.
    NotFound(PathBuf),
    /// The control file exists but could not be read.
    Unreadable { path: PathBuf, error: io::Error },
    /// The content does not start with a decimal integer.
    Parse { path: PathBuf, content: String },
}

impl ControlReadError {
    /// Check if the value is missing rather than malformed.
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            ControlReadError::Unresolved(_) | ControlReadError::NotFound(_)
        )
    }
}

impl fmt::Display for ControlReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlReadError::Unresolved(subsystem) => {
                write!(f, "no cgroup path for subsystem {}", subsystem)
            }
            ControlReadError::NotFound(path) => {
                write!(f, "read file {} error: not found", path.display())
            }
            ControlReadError::Unreadable { path, error } => {
                write!(f, "read file {} error: {}", path.display(), error)
            }
            ControlReadError::Parse { path, content } => {
                write!(
                    f,
                    "invalid integer in {}: '{}'",
                    path.display(),
                    content.trim()
                )
            }
        }
    }
}

impl std::error::Error for ControlReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlReadError::Unreadable { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Read `file` from `subsystem`'s cgroup directory as an integer.
pub fn read_control_value(
    fs: &dyn ProcFs,
    paths: &CgroupPaths,
    subsystem: Subsystem,
    file: &str,
) -> Result<i64, ControlReadError> {
    let dir = paths
        .resolve(fs, subsystem)
        .ok_or(ControlReadError::Unresolved(subsystem))?;
    let path = dir.join(file);

    let content = match fs.read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ControlReadError::NotFound(path));
        }
        Err(error) => return Err(ControlReadError::Unreadable { path, error }),
    };

    parse_leading_int(&content).ok_or(ControlReadError::Parse { path, content })
}

/// Parse the decimal integer at the start of `content`.
///
/// Leading whitespace and a sign are accepted; anything after the digits is
/// ignored (`"100000\n"`, `"42abc"`). Returns `None` when no digits lead.
pub fn parse_leading_int(content: &str) -> Option<i64> {
    let s = content.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// CPUs implied by a CFS quota, or `raw_count` when no quota applies.
///
/// A quota applies when `quota > -1` and `period > 0`; the result is
/// `ceil(quota / period)`.
pub fn quota_count(quota: Option<i64>, period: Option<i64>, raw_count: usize) -> usize {
    match (quota, period) {
        (Some(quota), Some(period)) if quota > -1 && period > 0 => {
            (quota as u64).div_ceil(period as u64) as usize
        }
        _ => raw_count,
    }
}

/// CPUs implied by `cpu.shares` (`ceil(shares / 1024)`), or `raw_count`
/// when unknown.
pub fn share_count(shares: Option<i64>, raw_count: usize) -> usize {
    match shares {
        Some(shares) => (shares.max(0) as u64).div_ceil(SHARES_PER_CPU) as usize,
        None => raw_count,
    }
}

/// Everything that went into one CPU count decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuReport {
    /// Logical CPUs reported by the OS.
    pub raw_count: usize,
    /// Whether cgroup files were consulted (Linux only).
    pub cgroup: bool,
    /// `cpu.shares`, if known.
    pub cpu_shares: Option<i64>,
    /// `cpu.cfs_quota_us`, if known.
    pub quota: Option<i64>,
    /// `cpu.cfs_period_us`, if known.
    pub period: Option<i64>,
    /// CPUs implied by `cpu.shares`. Not used for the decision.
    pub share_count: usize,
    /// CPUs implied by the CFS quota.
    pub quota_count: usize,
    /// Final answer: `min(quota_count, raw_count)`, at least 1.
    pub available: usize,
}

impl CpuReport {
    /// Report for a platform without cgroups.
    pub fn unrestricted(raw_count: usize) -> Self {
        let raw_count = raw_count.max(1);
        Self {
            raw_count,
            cgroup: false,
            cpu_shares: None,
            quota: None,
            period: None,
            share_count: raw_count,
            quota_count: raw_count,
            available: raw_count,
        }
    }

    /// Combine cgroup values with the OS count.
    pub fn compute(
        raw_count: usize,
        cpu_shares: Option<i64>,
        quota: Option<i64>,
        period: Option<i64>,
    ) -> Self {
        let raw_count = raw_count.max(1);
        let quota_count = quota_count(quota, period, raw_count);

        Self {
            raw_count,
            cgroup: true,
            cpu_shares,
            quota,
            period,
            share_count: share_count(cpu_shares, raw_count),
            quota_count,
            available: quota_count.min(raw_count).max(1),
        }
    }

    /// CFS quota as a fraction of CPUs (e.g. 2.5), `None` when unlimited.
    pub fn cpu_quota(&self) -> Option<f64> {
        match (self.quota, self.period) {
            (Some(quota), Some(period)) if quota > -1 && period > 0 => {
                Some(quota as f64 / period as f64)
            }
            _ => None,
        }
    }

    /// Get CPU quota in human-readable format.
    pub fn cpu_quota_display(&self) -> String {
        match self.cpu_quota() {
            Some(quota) => format!("{:.2} CPUs", quota),
            None => "unlimited".to_string(),
        }
    }
}
