//! Locations of the procfs files the resolver reads.

use std::path::PathBuf;

use super::parse::env_abs_path;
use super::ConfigError;
use crate::system::{CgroupPaths, PROC_SELF_CGROUP, PROC_SELF_MOUNTINFO};

/// Source file configuration loaded from environment.
///
/// Overriding the paths lets a process inspect another mount namespace
/// (e.g. `/host/proc/1/mountinfo`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Mount table (AVAIL_CPU_COUNT_MOUNTINFO).
    pub mountinfo: PathBuf,
    /// cgroup membership file (AVAIL_CPU_COUNT_CGROUP).
    pub cgroup: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mountinfo: PathBuf::from(PROC_SELF_MOUNTINFO),
            cgroup: PathBuf::from(PROC_SELF_CGROUP),
        }
    }
}

impl SourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            mountinfo: env_abs_path("AVAIL_CPU_COUNT_MOUNTINFO", PROC_SELF_MOUNTINFO)?,
            cgroup: env_abs_path("AVAIL_CPU_COUNT_CGROUP", PROC_SELF_CGROUP)?,
        })
    }

    /// Fresh, unpopulated path cache over these sources.
    pub fn cgroup_paths(&self) -> CgroupPaths {
        CgroupPaths::new(&self.mountinfo, &self.cgroup)
    }
}
