//! Access to the kernel's pseudo-filesystems.
//!
//! Everything under `/proc` and `/sys/fs/cgroup` is read through [`ProcFs`]
//! so tests can substitute an in-memory tree.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of procfs/cgroupfs.
///
/// All reads are synchronous and blocking. The files are kernel-generated,
/// so a read either completes immediately or fails (typically `NotFound`).
pub trait ProcFs: Send + Sync {
    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl ProcFs for HostFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// A source file (mount table or membership file) could not be read.
#[derive(Debug)]
pub struct SourceError {
    pub path: PathBuf,
    pub error: io::Error,
}

impl SourceError {
    pub(crate) fn read(fs: &dyn ProcFs, path: &Path) -> Result<String, Self> {
        fs.read_to_string(path).map_err(|error| SourceError {
            path: path.to_path_buf(),
            error,
        })
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read {} error: {}", self.path.display(), self.error)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
