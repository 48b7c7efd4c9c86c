//! Path resolution against an on-disk mount table

use crate::helpers::CgroupTree;
use avail_cpus::system::{ControlReadError, Subsystem, CPU_CFS_QUOTA_US};

#[test]
fn test_kubernetes_nested_root() {
    let pod = "/kubepods/burstable/pod6d65aafe/925ee826";
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[
        (pod, "cpu,cpuacct", "rw,cpu,cpuacct"),
        (pod, "memory", "rw,memory"),
    ]);
    tree.write_cgroup(&format!("10:memory:{pod}\n4:cpu,cpuacct:{pod}\n"));

    let counter = tree.counter(4);
    let fs = avail_cpus::system::HostFs;
    let paths = counter.paths();

    assert_eq!(
        paths.resolve(&fs, Subsystem::Cpu),
        Some(tree.mount_point("cpu,cpuacct"))
    );
    assert_eq!(
        paths.resolve(&fs, Subsystem::Cpuacct),
        Some(tree.mount_point("cpu,cpuacct"))
    );
    assert_eq!(
        paths.resolve(&fs, Subsystem::Memory),
        Some(tree.mount_point("memory"))
    );
}

#[test]
fn test_separate_cpu_and_cpuacct() {
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[("/", "cpu", "rw,cpu"), ("/", "cpuacct", "rw,cpuacct")]);
    tree.write_cgroup("5:cpuacct:/a\n4:cpu:/b\n");

    let counter = tree.counter(4);
    let fs = avail_cpus::system::HostFs;

    assert_eq!(
        counter.paths().resolve(&fs, Subsystem::Cpu),
        Some(tree.mount_point("cpu").join("b"))
    );
    assert_eq!(
        counter.paths().resolve(&fs, Subsystem::Cpuacct),
        Some(tree.mount_point("cpuacct").join("a"))
    );
}

#[test]
fn test_foreign_cgroup_namespace() {
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[("/x", "cpu", "rw,cpu")]);
    tree.write_cgroup("4:cpu:/z\n");

    let counter = tree.counter(4);
    let err = counter
        .read_control_value(Subsystem::Cpu, CPU_CFS_QUOTA_US)
        .unwrap_err();
    assert!(matches!(err, ControlReadError::Unresolved(Subsystem::Cpu)));
    assert_eq!(counter.available(), 4);
    assert!(counter.paths().is_initialized());
}

#[test]
fn test_cpuset_only_host() {
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[("/", "cpuset", "rw,cpuset")]);
    tree.write_cgroup("1:cpuset:/\n");

    let counter = tree.counter(4);
    let table = counter
        .paths()
        .table(&avail_cpus::system::HostFs)
        .expect("sources are readable");
    assert!(table.is_empty());
}

#[test]
fn test_root_cgroup() {
    let tree = CgroupTree::new();
    tree.write_mountinfo(&[("/", "cpu,cpuacct", "rw,cpu,cpuacct")]);
    tree.write_cgroup("4:cpu,cpuacct:/\n");
    tree.write_control("cpu,cpuacct", "/", CPU_CFS_QUOTA_US, "400000\n");

    let counter = tree.counter(8);
    assert_eq!(counter.read_control_value(Subsystem::Cpu, CPU_CFS_QUOTA_US).unwrap(), 400000);
}
