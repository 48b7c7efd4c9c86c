//! Integration tests for avail_cpus
//!
//! Each test writes a fake procfs/cgroupfs tree into a temp dir and points a
//! `CpuCounter` at it, exercising the real filesystem reader.
//! Run with: cargo test --test integration

mod helpers;

mod cpu_count;
mod path_resolution;
