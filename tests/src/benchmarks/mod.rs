//! # Klay-Core Benchmarks
//!
//! Criterion groups, registered by the bench targets under `benches/`.

pub mod recovery;
