//! # Sender Recovery Benchmarks
//!
//! Sequential against rayon-parallel recovery over block-sized batches.
//! Every iteration starts from freshly decoded transactions so the sender
//! caches are cold.

use crate::fixtures::{self, CHAIN_ID};
use criterion::{black_box, BatchSize, BenchmarkId, Criterion, Throughput};
use kc_transactions::{recover_senders, recover_senders_sequential, LondonSigner, Transaction};
use std::sync::Arc;
use std::time::Duration;

/// Wire bytes of `count` signed transactions, half legacy and half native.
pub fn signed_batch(count: usize) -> Vec<Vec<u8>> {
    let signer = LondonSigner::new(CHAIN_ID);
    let keys = fixtures::keys(8);
    (0..count)
        .map(|i| {
            let key = &keys[i % keys.len()];
            let nonce = (i / keys.len()) as u64;
            let tx = if i % 2 == 0 {
                fixtures::signed_legacy(key, &signer, nonce, 25)
            } else {
                fixtures::signed_value_transfer(key, &signer, nonce, 25)
            };
            tx.encode()
        })
        .collect()
}

fn cold(batch: &[Vec<u8>]) -> Vec<Arc<Transaction>> {
    batch
        .iter()
        .filter_map(|bytes| Transaction::decode(bytes).ok().map(Arc::new))
        .collect()
}

pub fn bench_sender_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("kc-transactions/sender_recovery");
    group.measurement_time(Duration::from_secs(10));
    let signer = LondonSigner::new(CHAIN_ID);

    for size in [16usize, 128, 1024] {
        let batch = signed_batch(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &batch, |b, batch| {
            b.iter_batched(
                || cold(batch),
                |txs| black_box(recover_senders_sequential(&signer, &txs)),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &batch, |b, batch| {
            b.iter_batched(
                || cold(batch),
                |txs| black_box(recover_senders(&signer, &txs)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

pub fn bench_cached_sender(c: &mut Criterion) {
    let signer = LondonSigner::new(CHAIN_ID);
    let txs = cold(&signed_batch(1));
    let tx = &txs[0];
    let _ = tx.sender(&signer);

    c.bench_function("kc-transactions/sender_cached", |b| {
        b.iter(|| black_box(tx.sender(&signer)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_decodes_and_recovers() {
        let batch = signed_batch(10);
        let txs = cold(&batch);
        assert_eq!(txs.len(), 10);
        let signer = LondonSigner::new(CHAIN_ID);
        let parallel = recover_senders(&signer, &txs);
        let sequential = recover_senders_sequential(&signer, &cold(&batch));
        assert_eq!(parallel, sequential);
        assert!(parallel.iter().all(Result::is_ok));
    }
}
