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

//! Read-through memoization of aggregation results.
//!
//! Entries are keyed on the transfer count and the timestamp of the last
//! transfer in the list, plus a fingerprint of the full list so that a
//! delete followed by an insert cannot hit a stale entry. Once the cache
//! holds more than its capacity the oldest entry is evicted.

use crate::aggregate::Aggregates;
use crate::transfer::TransferEvent;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub len: usize,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub fingerprint: u64,
}

impl CacheKey {
    pub fn of(events: &[TransferEvent]) -> Self {
        let mut hasher = DefaultHasher::new();
        events.hash(&mut hasher);
        Self {
            len: events.len(),
            last_timestamp: events.last().map(|e| e.timestamp),
            fingerprint: hasher.finish(),
        }
    }
}

#[derive(Debug)]
pub struct AggregateCache {
    capacity: usize,
    entries: Mutex<VecDeque<(CacheKey, Arc<Aggregates>)>>,
}

impl AggregateCache {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    /// Returns the cached aggregates for `events`, running `compute` on a miss.
    ///
    /// `compute` runs outside the lock.
    pub fn get_or_compute<F>(&self, events: &[TransferEvent], compute: F) -> Arc<Aggregates>
    where
        F: FnOnce(&[TransferEvent]) -> Aggregates,
    {
        let key = CacheKey::of(events);
        if let Some(hit) = self.get(&key) {
            tracing::debug!(len = key.len, "aggregate cache hit");
            return hit;
        }

        let aggregates = Arc::new(compute(events));
        let mut entries = self.entries.lock();
        entries.retain(|(existing, _)| *existing != key);
        entries.push_back((key, Arc::clone(&aggregates)));
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        aggregates
    }

    fn get(&self, key: &CacheKey) -> Option<Arc<Aggregates>> {
        self.entries
            .lock()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, aggregates)| Arc::clone(aggregates))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for AggregateCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
