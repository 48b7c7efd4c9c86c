//! Per-subsystem cgroup directory resolution (cgroup v1).
//!
//! Combines the process's membership (`/proc/self/cgroup`) with the mount
//! table to find the directory holding each subsystem's control files, e.g.
//! `/sys/fs/cgroup/cpu,cpuacct/kubepods/burstable/pod6d65/925e`.
//!
//! # Example
//!
//! ```rust,ignore
//! use avail_cpus::system::{CgroupPaths, HostFs, Subsystem};
//!
//! let paths = CgroupPaths::from_proc();
//! if let Some(dir) = paths.resolve(&HostFs, Subsystem::Cpu) {
//!     println!("cpu controller at {}", dir.display());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::fs::{ProcFs, SourceError};
use super::mounts::{discover_subsystem_mounts, MountEntry, SubsystemMountTable};
use super::subsystem::{classify, Subsystem};

/// Default mount table location.
pub const PROC_SELF_MOUNTINFO: &str = "/proc/self/mountinfo";

/// Default membership file location.
pub const PROC_SELF_CGROUP: &str = "/proc/self/cgroup";

/// Subsystem -> absolute directory of its control files.
pub type CgroupPathTable = HashMap<Subsystem, PathBuf>;

/// Lazily resolved, never refreshed [`CgroupPathTable`].
///
/// The first successful [`table`](Self::table) call populates the cache; a
/// failed attempt (unreadable mount table or membership file) leaves it empty
/// so the next call tries again.
#[derive(Debug)]
pub struct CgroupPaths {
    mountinfo: PathBuf,
    membership: PathBuf,
    table: Mutex<Option<Arc<CgroupPathTable>>>,
}

impl CgroupPaths {
    /// Resolver reading the given mount table and membership file.
    pub fn new(mountinfo: impl Into<PathBuf>, membership: impl Into<PathBuf>) -> Self {
        Self {
            mountinfo: mountinfo.into(),
            membership: membership.into(),
            table: Mutex::new(None),
        }
    }

    /// Resolver for the current process (`/proc/self/...`).
    pub fn from_proc() -> Self {
        Self::new(PROC_SELF_MOUNTINFO, PROC_SELF_CGROUP)
    }

    /// Mount table this resolver reads.
    pub fn mountinfo_path(&self) -> &Path {
        &self.mountinfo
    }

    /// Membership file this resolver reads.
    pub fn membership_path(&self) -> &Path {
        &self.membership
    }

    /// Whether a resolution pass has completed.
    pub fn is_initialized(&self) -> bool {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Get the resolved table, running the resolution pass on first use.
    ///
    /// The lock is held across the pass so concurrent first callers wait for
    /// one population instead of racing.
    pub fn table(&self, fs: &dyn ProcFs) -> Result<Arc<CgroupPathTable>, SourceError> {
        let mut guard = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            return Ok(Arc::clone(table));
        }

        let mounts = discover_subsystem_mounts(fs, &self.mountinfo)?;
        let membership = SourceError::read(fs, &self.membership)?;
        let table = Arc::new(resolve_membership(&membership, &mounts));

        *guard = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Directory of `subsystem`'s control files, if it could be resolved.
    ///
    /// Unreadable sources are reported at debug level and yield `None`.
    pub fn resolve(&self, fs: &dyn ProcFs, subsystem: Subsystem) -> Option<PathBuf> {
        match self.table(fs) {
            Ok(table) => table.get(&subsystem).cloned(),
            Err(err) => {
                debug!("{}", err);
                None
            }
        }
    }
}

impl Default for CgroupPaths {
    fn default() -> Self {
        Self::from_proc()
    }
}

/// Resolve every membership line against the mount table.
///
/// Lines are `<hierarchy-id>:<controllers>:<dir>`; lines with fewer than
/// three fields are skipped.
pub fn resolve_membership(content: &str, mounts: &SubsystemMountTable) -> CgroupPathTable {
    let mut table = CgroupPathTable::new();

    for line in content.lines() {
        let mut fields = line.splitn(3, ':');
        let (Some(_), Some(controllers), Some(dir)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        for subsystem in classify(controllers) {
            let Some(entry) = mounts.get(subsystem) else {
                trace!(%subsystem, "No mount for subsystem");
                continue;
            };

            match reconcile(entry, dir) {
                Some(path) => {
                    debug!(%subsystem, path = %path.display(), "Resolved cgroup path");
                    table.insert(*subsystem, path);
                }
                None => {
                    trace!(
                        %subsystem,
                        root = %entry.root,
                        dir,
                        "cgroup dir is outside the mounted root"
                    );
                }
            }
        }
    }

    table
}

/// Map a membership directory onto the mount that exposes it.
///
/// Returns `None` when `dir` is not under the mount's root (string prefix).
pub fn reconcile(entry: &MountEntry, dir: &str) -> Option<PathBuf> {
    if entry.root == "/" {
        if dir == "/" {
            return Some(PathBuf::from(&entry.mount_point));
        }
        return Some(PathBuf::from(format!("{}{}", entry.mount_point, dir)));
    }

    if entry.root == dir {
        return Some(PathBuf::from(&entry.mount_point));
    }

    let suffix = dir.strip_prefix(entry.root.as_str())?;
    Some(PathBuf::from(format!("{}{}", entry.mount_point, suffix)))
}
