//! Mount table parsing.
//!
//! Finds the cgroup v1 hierarchies mounted in this process's mount namespace
//! by reading `/proc/self/mountinfo` (proc(5), section "/proc/pid/mountinfo").
//!
//! ```text
//! 2538 2528 0:33 /kubepods/burstable/pod6d65/925e /sys/fs/cgroup/memory ro,nosuid master:21 - cgroup cgroup rw,memory
//! (1)  (2)  (3)  (4)                              (5)                   (6)        (7)       (8) (9) (10)  (11)
//! ```
//!
//! Field 4 is the root of the hierarchy exposed by the mount, field 5 the
//! mount point. Optional fields (7) end at a lone `-`, followed by the
//! filesystem type, mount source and super options.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use super::fs::{ProcFs, SourceError};
use super::subsystem::{classify, Subsystem};

/// Lines shorter than this cannot carry all mandatory fields.
const MIN_FIELDS: usize = 11;

/// Index of the first optional field; the separator is never before it.
const OPTIONAL_FIELDS_START: usize = 6;

/// One cgroup mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    /// Subtree of the hierarchy exposed at `mount_point` (`/` or `/kubepods/...`).
    pub root: String,
    /// Absolute path the subtree is mounted at.
    pub mount_point: String,
}

/// Subsystem -> mount. Co-mounted subsystems share one `Arc`.
pub type SubsystemMountTable = HashMap<Subsystem, Arc<MountEntry>>;

/// Read and parse the mount table at `path`.
pub fn discover_subsystem_mounts(
    fs: &dyn ProcFs,
    path: &Path,
) -> Result<SubsystemMountTable, SourceError> {
    let content = SourceError::read(fs, path)?;
    let mounts = parse_mountinfo(&content);
    debug!(count = mounts.len(), "Discovered cgroup subsystem mounts");
    Ok(mounts)
}

/// Parse mountinfo content. Malformed and non-cgroup lines are skipped;
/// a later line for the same subsystem replaces an earlier one.
pub fn parse_mountinfo(content: &str) -> SubsystemMountTable {
    let mut mounts = SubsystemMountTable::new();

    for line in content.lines() {
        let Some((entry, options)) = parse_line(line) else {
            continue;
        };

        let subsystems = classify(options);
        if subsystems.is_empty() {
            trace!(options, "Skipping untracked cgroup mount");
            continue;
        }

        let entry = Arc::new(entry);
        for subsystem in subsystems {
            trace!(
                %subsystem,
                root = %entry.root,
                mount_point = %entry.mount_point,
                "cgroup mount"
            );
            mounts.insert(*subsystem, Arc::clone(&entry));
        }
    }

    mounts
}

/// Split one line into its mount entry and super options.
/// Returns `None` for anything that is not a well-formed cgroup (v1) mount.
fn parse_line(line: &str) -> Option<(MountEntry, &str)> {
    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let separator = OPTIONAL_FIELDS_START
        + fields[OPTIONAL_FIELDS_START..]
            .iter()
            .position(|f| *f == "-")?;

    let fstype = *fields.get(separator + 1)?;
    let options = *fields.get(separator + 3)?;

    if fstype != "cgroup" {
        return None;
    }

    Some((
        MountEntry {
            root: unescape(fields[3]),
            mount_point: unescape(fields[4]),
        },
        options,
    ))
}

/// Undo the kernel's octal escaping of space, tab, newline and backslash
/// (`\040`, `\011`, `\012`, `\134`) in path fields.
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
