// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for the ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Aggregation over growing transfer lists
//! - Summaries through the cache, hit and miss
//! - Goods type breakdown of a single unit
//! - Multi-threaded concurrent recording

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use karat_ledger_rs::{
    Karat, Ledger, TransferEvent, TransferId, UnitId, UnitTaxonomy, compute_aggregates,
    compute_goods_type_breakdown,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Helper Functions
// =============================================================================

const GOODS_TYPES: [&str; 4] = ["kolye", "bilezik", "yuzuk", "kupe"];

fn make_transfer(id: u64) -> TransferEvent {
    let from = UnitId::ALL[(id % UnitId::COUNT as u64) as usize];
    let to = UnitId::ALL[((id + 1) % UnitId::COUNT as u64) as usize];
    TransferEvent::new(
        TransferId(id),
        from,
        to,
        Karat::ALL[(id % 4) as usize],
        Decimal::new(1_000 + (id % 997) as i64, 3),
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id as i64),
    )
    .with_goods_type(GOODS_TYPES[(id % 4) as usize])
}

fn make_transfers(count: u64) -> Vec<TransferEvent> {
    (1..=count).map(make_transfer).collect()
}

fn ledger_with(count: u64) -> Ledger {
    let ledger = Ledger::new();
    for transfer in make_transfers(count) {
        let _ = ledger.record(transfer);
    }
    ledger
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let taxonomy = UnitTaxonomy::default();

    for count in [100u64, 1_000, 10_000].iter() {
        let transfers = make_transfers(*count);
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &transfers, |b, transfers| {
            b.iter(|| black_box(compute_aggregates(black_box(transfers), &taxonomy)))
        });
    }
    group.finish();
}

fn bench_summaries(c: &mut Criterion) {
    let mut group = c.benchmark_group("summaries");

    for count in [100u64, 1_000, 10_000].iter() {
        let ledger = ledger_with(*count);
        group.throughput(Throughput::Elements(*count));

        group.bench_with_input(BenchmarkId::new("cached", count), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.summaries()))
        });

        group.bench_with_input(BenchmarkId::new("uncached", count), count, |b, &count| {
            let ledger = ledger_with(count);
            let mut next = count + 1;
            b.iter(|| {
                // A new transfer invalidates the cache key.
                let _ = ledger.record(make_transfer(next));
                next += 1;
                black_box(ledger.summaries())
            })
        });
    }
    group.finish();
}

fn bench_goods_type_breakdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("goods_type_breakdown");
    let taxonomy = UnitTaxonomy::default();

    for count in [1_000u64, 10_000].iter() {
        let transfers = make_transfers(*count);
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &transfers, |b, transfers| {
            b.iter(|| {
                black_box(compute_goods_type_breakdown(
                    transfers,
                    &taxonomy,
                    UnitId::AnaKasa,
                ))
            })
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_record");

    for count in [1_000u64, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let ledger = Arc::new(Ledger::new());
                let id_counter = AtomicU64::new(1);

                (0..count).into_par_iter().for_each(|_| {
                    let id = id_counter.fetch_add(1, Ordering::SeqCst);
                    let _ = ledger.record(make_transfer(id));
                });

                black_box(&ledger);
            })
        });
    }
    group.finish();
}

fn bench_parallel_record_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_record_and_query");

    for count in [1_000u64, 10_000].iter() {
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let ledger = Arc::new(Ledger::new());

                (1..=count).into_par_iter().for_each(|id| {
                    let _ = ledger.record(make_transfer(id));
                    if id % 100 == 0 {
                        black_box(ledger.totals());
                    }
                });

                black_box(&ledger);
            })
        });
    }
    group.finish();
}

criterion_group!(
    single_threaded,
    bench_aggregation,
    bench_summaries,
    bench_goods_type_breakdown,
);

criterion_group!(
    multi_threaded,
    bench_parallel_record,
    bench_parallel_record_and_query,
);

criterion_main!(single_threaded, multi_threaded);
