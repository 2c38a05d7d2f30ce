//! # Klay-Core Recovery Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `sender_recovery/sequential` | one thread, cold caches |
//! | `sender_recovery/parallel` | rayon pool, cold caches |
//! | `sender_cached` | cache hit on a recovered envelope |

use criterion::{criterion_group, criterion_main};
use kc_tests::benchmarks::recovery::{bench_cached_sender, bench_sender_recovery};

criterion_group!(benches, bench_sender_recovery, bench_cached_sender);
criterion_main!(benches);
