//! Benchmark utilities for the forage engine.
//!
//! - **Pool benchmarks**: entity creation, copying, release and system iteration.
//! - **Collision benchmarks**: full detection and resolution passes over seeded random crowds.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p forage_bench
//!
//! # Run one group
//! cargo bench -p forage_bench -- collision_pass
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod components;
pub mod crowd;
