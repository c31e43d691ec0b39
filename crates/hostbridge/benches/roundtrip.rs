// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Bench code readability over pedantic
#![allow(clippy::cast_precision_loss)] // Synthetic data conversions
#![allow(clippy::missing_panics_doc)] // Benches panic on failure

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hostbridge::{decode, encode, Configuration, Heap, HostRuntime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    value: f64,
    sequence: i64,
    flags: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Message {
    Batch { readings: Vec<Reading> },
    Labels(BTreeMap<String, String>),
}

fn batch(size: usize) -> Message {
    Message::Batch {
        readings: (0..size)
            .map(|i| Reading {
                sensor: format!("sensor-{}", i % 8),
                value: i as f64 * 0.25,
                sequence: i as i64,
                flags: vec![i % 2 == 0, i % 3 == 0],
            })
            .collect(),
    }
}

// ============================================================================
// Encode
// ============================================================================

/// Benchmark: encode a 100-reading batch
fn bench_encode_batch(c: &mut Criterion) {
    let heap = Heap::new();
    let config = Configuration::default();
    let message = batch(100);
    c.bench_function("encode_batch_100", |b| {
        b.iter(|| {
            let root = encode(&heap, &config, black_box(&message)).unwrap();
            drop(root);
        })
    });
}

// ============================================================================
// Decode
// ============================================================================

/// Benchmark: decode a 100-reading batch
fn bench_decode_batch(c: &mut Criterion) {
    let heap = Heap::new();
    let config = Configuration::default();
    let root = encode(&heap, &config, &batch(100)).unwrap();
    c.bench_function("decode_batch_100", |b| {
        b.iter(|| {
            let message: Message = decode(&heap, &config, black_box(root.handle())).unwrap();
            message
        })
    });
}

/// Benchmark: full round trip on a fresh heap
fn bench_round_trip_fresh_heap(c: &mut Criterion) {
    let config = Configuration::default();
    let message = batch(10);
    c.bench_function("round_trip_batch_10_fresh_heap", |b| {
        b.iter_batched(
            Heap::new,
            |heap| {
                let root = encode(&heap, &config, &message).unwrap();
                let back: Message = decode(&heap, &config, root.handle()).unwrap();
                drop(root);
                assert_eq!(heap.reference_count(), 0);
                back
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_encode_batch,
    bench_decode_batch,
    bench_round_trip_fresh_heap
);
criterion_main!(benches);
