//! Hardware-specific tests requiring a real bench.
//!
//! These tests are ignored by default and require actual hardware to run.
//! They should be run manually with the `--ignored` flag on a host with
//! the bench tools installed.

pub mod bench_smoke;
