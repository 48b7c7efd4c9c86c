//! Test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};

use avail_cpus::system::{CgroupPaths, CpuCounter, Platform};
use tempfile::TempDir;

/// A fake `/proc/self` plus cgroup hierarchy rooted in a temp dir.
pub struct CgroupTree {
    dir: TempDir,
}

#[allow(dead_code)]
impl CgroupTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("proc")).expect("Failed to create proc dir");
        Self { dir }
    }

    /// Absolute path of a mount point inside the tree.
    pub fn mount_point(&self, name: &str) -> PathBuf {
        self.dir.path().join("cgroup").join(name)
    }

    pub fn mountinfo_path(&self) -> PathBuf {
        self.dir.path().join("proc/mountinfo")
    }

    pub fn cgroup_path(&self) -> PathBuf {
        self.dir.path().join("proc/cgroup")
    }

    /// Write the mount table; each entry is `(root, mount name, super options)`.
    pub fn write_mountinfo(&self, mounts: &[(&str, &str, &str)]) {
        let mut content = String::from(
            "22 27 0:21 / /sys rw,nosuid,nodev,noexec,relatime shared:7 - sysfs sysfs rw\n",
        );
        for (i, (root, name, options)) in mounts.iter().enumerate() {
            content.push_str(&format!(
                "{} 30 0:{} {} {} rw,nosuid,nodev,noexec,relatime shared:{} - cgroup cgroup {}\n",
                40 + i,
                40 + i,
                root,
                self.mount_point(name).display(),
                10 + i,
                options
            ));
        }
        fs::write(self.mountinfo_path(), content).expect("Failed to write mountinfo");
    }

    /// Write the membership file verbatim.
    pub fn write_cgroup(&self, content: &str) {
        fs::write(self.cgroup_path(), content).expect("Failed to write cgroup");
    }

    /// Write a control file below a mount point.
    pub fn write_control(&self, mount: &str, dir: &str, file: &str, content: &str) {
        let path = self
            .mount_point(mount)
            .join(dir.trim_start_matches('/'))
            .join(file);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create cgroup dir");
        fs::write(path, content).expect("Failed to write control file");
    }

    pub fn remove(&self, path: &Path) {
        fs::remove_file(path).expect("Failed to remove file");
    }

    /// Linux counter over this tree with a fixed OS CPU count.
    pub fn counter(&self, logical_cpus: usize) -> CpuCounter {
        CpuCounter::new()
            .with_paths(CgroupPaths::new(self.mountinfo_path(), self.cgroup_path()))
            .with_platform(Platform::Linux)
            .with_logical_cpus(logical_cpus)
    }
}
