//! cgroup v1 discovery and CPU quota detection.
//!
//! Resolution happens in three steps:
//!
//! - **Mounts**: `/proc/self/mountinfo` tells where each cgroup hierarchy
//!   (`cpu`, `cpuacct`, `memory`) is mounted and which subtree it exposes.
//! - **Paths**: `/proc/self/cgroup` gives the process's directory in each
//!   hierarchy; combined with the mounts this yields real directories.
//! - **Quota**: `cpu.cfs_quota_us` / `cpu.cfs_period_us` in the `cpu`
//!   directory bound the OS CPU count.
//!
//! cgroup v2 (`cpu.max` on a unified mount) is not handled.
//!
//! # Example
//!
//! ```rust,ignore
//! use avail_cpus::system::CpuCounter;
//!
//! let counter = CpuCounter::new();
//! let report = counter.report();
//! println!("CPU quota: {}, workers: {}", report.cpu_quota_display(), report.available);
//! ```

mod cgroup;
mod cpu;
mod fs;
mod mounts;
mod quota;
mod subsystem;

pub use cgroup::{
    reconcile, resolve_membership, CgroupPathTable, CgroupPaths, PROC_SELF_CGROUP,
    PROC_SELF_MOUNTINFO,
};
pub use cpu::{CpuCounter, Platform, DIAGNOSTICS_TARGET};
pub use fs::{HostFs, ProcFs, SourceError};
pub use mounts::{discover_subsystem_mounts, parse_mountinfo, MountEntry, SubsystemMountTable};
pub use quota::{
    parse_leading_int, quota_count, read_control_value, share_count, ControlReadError, CpuReport,
    CPU_CFS_PERIOD_US, CPU_CFS_QUOTA_US, CPU_SHARES, SHARES_PER_CPU,
};
pub use subsystem::{classify, Classification, Subsystem, CLASSIFICATION_RULES};
