//! cgroup v1 subsystems and controller-list classification.

use std::fmt;

/// cgroup v1 subsystem (controller) tracked by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// `memory` controller
    Memory,
    /// `cpu` controller (CFS quota, shares)
    Cpu,
    /// `cpuacct` controller (CPU accounting)
    Cpuacct,
}

impl Subsystem {
    /// Kernel name of the subsystem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Cpu => "cpu",
            Self::Cpuacct => "cpuacct",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Controller list is recognised but deliberately not tracked.
    Ignore,
    /// Controller list maps to these subsystems.
    Subsystems(&'static [Subsystem]),
}

/// Substring rules, evaluated in order; the first contained substring wins.
///
/// `cpuset` comes first because it contains `cpu`. `cpu,cpuacct` comes
/// before the single-controller rules so a co-mounted hierarchy feeds both
/// keys.
pub const CLASSIFICATION_RULES: &[(&str, Classification)] = &[
    ("cpuset", Classification::Ignore),
    (
        "cpu,cpuacct",
        Classification::Subsystems(&[Subsystem::Cpu, Subsystem::Cpuacct]),
    ),
    ("cpuacct", Classification::Subsystems(&[Subsystem::Cpuacct])),
    ("cpu", Classification::Subsystems(&[Subsystem::Cpu])),
    ("memory", Classification::Subsystems(&[Subsystem::Memory])),
];

/// Map a comma-joined controller list (mount super-options or the
/// controller field of `/proc/self/cgroup`) to the subsystems it serves.
///
/// Returns an empty slice for ignored or unrelated controllers.
pub fn classify(controllers: &str) -> &'static [Subsystem] {
    for (needle, class) in CLASSIFICATION_RULES {
        if controllers.contains(needle) {
            return match class {
                Classification::Ignore => &[],
                Classification::Subsystems(subsystems) => *subsystems,
            };
        }
    }
    &[]
}
