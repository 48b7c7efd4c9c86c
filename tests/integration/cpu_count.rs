//! CPU count computation against an on-disk cgroup tree

use crate::helpers::CgroupTree;
use avail_cpus::system::{Platform, CPU_CFS_PERIOD_US, CPU_CFS_QUOTA_US, CPU_SHARES};

const DIR: &str = "/docker/0123abcd";

fn docker_tree(quota: &str, period: &str) -> CgroupTree {
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[
        ("/", "cpuset", "rw,cpuset"),
        ("/", "cpu,cpuacct", "rw,cpu,cpuacct"),
        ("/", "memory", "rw,memory"),
    ]);
    tree.write_cgroup(&format!(
        "12:cpuset:{DIR}\n11:memory:{DIR}\n4:cpu,cpuacct:{DIR}\n1:name=systemd:{DIR}\n"
    ));
    tree.write_control("cpu,cpuacct", DIR, CPU_SHARES, "1024\n");
    tree.write_control("cpu,cpuacct", DIR, CPU_CFS_QUOTA_US, quota);
    tree.write_control("cpu,cpuacct", DIR, CPU_CFS_PERIOD_US, period);
    tree
}

#[test]
fn test_two_cpu_quota() {
    let tree = docker_tree("200000\n", "100000\n");
    assert_eq!(tree.counter(4).available(), 2);
}

#[test]
fn test_fractional_quota_rounds_up() {
    let tree = docker_tree("150000\n", "100000\n");
    let report = tree.counter(8).report();
    assert_eq!(report.quota_count, 2);
    assert_eq!(report.available, 2);
    assert_eq!(report.cpu_quota_display(), "1.50 CPUs");
}

#[test]
fn test_quota_larger_than_machine() {
    let tree = docker_tree("350000\n", "100000\n");
    assert_eq!(tree.counter(2).available(), 2);
}

#[test]
fn test_no_quota() {
    let tree = docker_tree("-1\n", "100000\n");
    let report = tree.counter(4).report();
    assert_eq!(report.quota, Some(-1));
    assert_eq!(report.available, 4);
    assert_eq!(report.share_count, 1);
}

#[test]
fn test_missing_period_falls_back() {
    let tree = docker_tree("200000\n", "100000\n");
    tree.remove(
        &tree
            .mount_point("cpu,cpuacct")
            .join(DIR.trim_start_matches('/'))
            .join(CPU_CFS_PERIOD_US),
    );
    let report = tree.counter(4).report();
    assert_eq!(report.period, None);
    assert_eq!(report.available, 4);
}

#[test]
fn test_non_linux_uses_os_count() {
    let tree = docker_tree("100000\n", "100000\n");
    let counter = tree.counter(8).with_platform(Platform::Other);
    assert_eq!(counter.available(), 8);
    assert!(!counter.paths().is_initialized());
}

#[test]
fn test_paths_cached_values_reread() {
    let tree = docker_tree("100000\n", "100000\n");
    let counter = tree.counter(8);
    assert_eq!(counter.available(), 1);

    // Mount table is not consulted again once resolved
    tree.remove(&tree.mountinfo_path());
    tree.remove(&tree.cgroup_path());
    assert_eq!(counter.available(), 1);

    // Control files are read on every call
    tree.write_control("cpu,cpuacct", DIR, CPU_CFS_QUOTA_US, "300000\n");
    assert_eq!(counter.available(), 3);
}

#[test]
fn test_unreadable_sources() {
    let tree = CgroupTree::new();
    let counter = tree.counter(4);
    assert_eq!(counter.available(), 4);
    assert!(!counter.paths().is_initialized());

    // Retried once the sources appear
    tree.write_mountinfo(&[("/", "cpu", "rw,cpu")]);
    tree.write_cgroup("3:cpu:/job\n");
    tree.write_control("cpu", "/job", CPU_CFS_QUOTA_US, "100000\n");
    tree.write_control("cpu", "/job", CPU_CFS_PERIOD_US, "100000\n");
    assert_eq!(counter.available(), 1);
    assert!(counter.paths().is_initialized());
}
