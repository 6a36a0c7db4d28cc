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

//! Deadlock detection tests using parking_lot's built-in deadlock detector.
//!
//! These tests drive the ledger from many threads at once, mixing records,
//! deletes, queries and vault reconciliation, and fail if the lock graph
//! ever forms a cycle.

use chrono::{TimeZone, Utc};
use karat_ledger_rs::{
    Karat, Ledger, TransferChange, TransferEvent, TransferId, TransferLog, UnitId, VaultError,
    VaultStock, VaultStockSource,
};
use parking_lot::deadlock;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

// === Helpers ===

fn transfer(id: u64, from: UnitId, to: UnitId) -> TransferEvent {
    TransferEvent::new(
        TransferId(id),
        from,
        to,
        Karat::ALL[(id % 4) as usize],
        dec!(1.5),
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(id as i64),
    )
}

struct ConstantVault;

impl VaultStockSource for ConstantVault {
    fn fetch_stock(&self) -> Result<Vec<VaultStock>, VaultError> {
        Ok(vec![VaultStock {
            karat: Karat::K22,
            amount: dec!(100),
        }])
    }
}

// === Deadlock Detection Infrastructure ===

/// Starts a background thread that checks for deadlocks.
/// Returns a handle to stop the detector.
fn start_deadlock_detector() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    thread::spawn(move || {
        while running_clone.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
            let deadlocks = deadlock::check_deadlock();
            if !deadlocks.is_empty() {
                eprintln!("\n=== DEADLOCK DETECTED ===");
                for (i, threads) in deadlocks.iter().enumerate() {
                    eprintln!("\nDeadlock #{}", i + 1);
                    for t in threads {
                        eprintln!("Thread ID: {:?}", t.thread_id());
                        eprintln!("Backtrace:\n{:#?}", t.backtrace());
                    }
                }
                panic!("Deadlock detected! See output above for details.");
            }
        }
    });

    running
}

/// Stops the deadlock detector.
fn stop_deadlock_detector(running: Arc<AtomicBool>) {
    running.store(false, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(150)); // Let detector thread exit
}

// === Tests ===

/// Many writers and readers on the same ledger.
#[test]
fn no_deadlock_concurrent_record_and_query() {
    let detector = start_deadlock_detector();
    let ledger = Arc::new(Ledger::new());
    let id_counter = Arc::new(AtomicU64::new(1));

    const NUM_THREADS: usize = 16;
    const OPS_PER_THREAD: usize = 100;

    let mut handles = Vec::with_capacity(NUM_THREADS);

    for thread_id in 0..NUM_THREADS {
        let ledger = ledger.clone();
        let id_counter = id_counter.clone();

        let handle = thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let from = UnitId::ALL[(thread_id + i) % UnitId::COUNT];
                let to = UnitId::ALL[(thread_id + i + 1) % UnitId::COUNT];

                if i % 4 == 3 {
                    // Read operations
                    let _ = ledger.summaries();
                    let _ = ledger.totals();
                } else {
                    let id = id_counter.fetch_add(1, Ordering::SeqCst);
                    ledger.record(transfer(id, from, to)).unwrap();
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    let expected = NUM_THREADS * OPS_PER_THREAD * 3 / 4;
    assert_eq!(ledger.transfers().len(), expected);
}

/// Deletes racing records, with subscribers attached.
#[test]
fn no_deadlock_record_delete_with_subscribers() {
    let detector = start_deadlock_detector();
    let ledger = Arc::new(Ledger::new());
    let changes = ledger.subscribe();

    const NUM_THREADS: u64 = 8;
    const OPS_PER_THREAD: u64 = 100;

    let mut handles = Vec::with_capacity(NUM_THREADS as usize);

    for thread_id in 0..NUM_THREADS {
        let ledger = ledger.clone();

        let handle = thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let id = thread_id * OPS_PER_THREAD + i + 1;
                ledger
                    .record(transfer(id, UnitId::AnaKasa, UnitId::Tezgah))
                    .unwrap();
                if i % 2 == 0 {
                    ledger.delete(TransferId(id)).unwrap();
                }
                let _ = ledger.goods_type_breakdown(UnitId::Tezgah);
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    let total = NUM_THREADS * OPS_PER_THREAD;
    assert_eq!(ledger.transfers().len() as u64, total / 2);
    // One notification per record plus one per delete.
    assert_eq!(changes.try_iter().count() as u64, total + total / 2);
}

/// Vault reconciliation while summaries are being read.
#[test]
fn no_deadlock_vault_reconciliation() {
    let detector = start_deadlock_detector();
    let ledger = Arc::new(Ledger::new());

    const NUM_THREADS: u64 = 8;

    let mut handles = Vec::with_capacity(NUM_THREADS as usize);

    for thread_id in 0..NUM_THREADS {
        let ledger = ledger.clone();

        let handle = thread::spawn(move || {
            for i in 0..50u64 {
                match (thread_id + i) % 3 {
                    0 => ledger.reconcile_vault(&ConstantVault).unwrap(),
                    1 => {
                        let id = thread_id * 1_000 + i + 1;
                        ledger
                            .record(transfer(id, UnitId::AnaKasa, UnitId::DisKasa))
                            .unwrap();
                    }
                    _ => {
                        let _ = ledger.summary(UnitId::DisKasa);
                    }
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    let vault = ledger.summary(UnitId::DisKasa).expect("vault summary");
    assert_eq!(vault.total_stock, dec!(100));
}

/// A delete racing the record it undoes must still reach subscribers after
/// that record, so replaying the feed reproduces the log.
#[test]
fn change_feed_follows_log_order_under_record_delete_race() {
    let detector = start_deadlock_detector();

    const ROUNDS: usize = 20;
    const TRANSFERS: u64 = 500;

    for round in 0..ROUNDS {
        let log = Arc::new(TransferLog::new());
        let changes = log.subscribe();

        let writer = {
            let log = log.clone();
            thread::spawn(move || {
                for id in 1..=TRANSFERS {
                    log.push(transfer(id, UnitId::AnaKasa, UnitId::Tezgah)).unwrap();
                }
            })
        };
        let deleter = {
            let log = log.clone();
            thread::spawn(move || {
                for id in 1..=TRANSFERS {
                    while log.remove(TransferId(id)).is_err() {
                        std::hint::spin_loop();
                    }
                }
            })
        };

        writer.join().expect("Thread panicked");
        deleter.join().expect("Thread panicked");

        let mut live = HashSet::new();
        for change in changes.try_iter() {
            match change {
                TransferChange::Recorded(event) => {
                    assert!(live.insert(event.id), "round {round}: {} recorded twice", event.id);
                }
                TransferChange::Deleted(event) => {
                    assert!(
                        live.remove(&event.id),
                        "round {round}: {} deleted before it was recorded",
                        event.id
                    );
                }
            }
        }

        assert!(log.is_empty());
        assert!(live.is_empty(), "round {round}: feed left {} live", live.len());
    }

    stop_deadlock_detector(detector);
}
