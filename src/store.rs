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

//! Thread-safe transfer log with deduplication and change notifications.
//!
//! The log is the single source of truth every projection is derived from.
//! It keeps transfers in creation order, rejects duplicate IDs, and hands
//! out immutable snapshots that never observe a half-applied mutation.

use crate::base::TransferId;
use crate::error::LedgerError;
use crate::transfer::TransferEvent;
use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A change applied to the log, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferChange {
    Recorded(Arc<TransferEvent>),
    Deleted(Arc<TransferEvent>),
}

/// A transfer log keyed by transfer ID.
///
/// Combines a [`DashMap`] for O(1) duplicate checks and lookups with an
/// ordered list of IDs preserving creation order. Mutations hold the order
/// lock for writing until their change notification is sent, snapshots hold
/// it for reading. `order` is always taken before a map shard or
/// `subscribers`.
#[derive(Debug)]
pub struct TransferLog {
    /// Map of transfer IDs to transfers.
    transfers: DashMap<TransferId, Arc<TransferEvent>>,

    /// Transfer IDs in creation order.
    order: RwLock<Vec<TransferId>>,

    subscribers: Mutex<Vec<Sender<TransferChange>>>,
}

impl TransferLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self {
            transfers: DashMap::new(),
            order: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Appends a transfer to the log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateTransfer`] if a transfer with the same
    /// ID is already in the log.
    pub fn push(&self, transfer: TransferEvent) -> Result<Arc<TransferEvent>, LedgerError> {
        let transfer = Arc::new(transfer);
        let mut order = self.order.write();
        match self.transfers.entry(transfer.id) {
            Entry::Occupied(_) => return Err(LedgerError::DuplicateTransfer),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&transfer));
                order.push(transfer.id);
            }
        }
        // Still under the order lock so subscribers see changes in log order.
        self.notify(TransferChange::Recorded(Arc::clone(&transfer)));
        Ok(transfer)
    }

    /// Removes a transfer from the log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TransferNotFound`] if no transfer has this ID.
    pub fn remove(&self, id: TransferId) -> Result<Arc<TransferEvent>, LedgerError> {
        let mut order = self.order.write();
        let (_, removed) = self
            .transfers
            .remove(&id)
            .ok_or(LedgerError::TransferNotFound)?;
        order.retain(|existing| *existing != id);
        self.notify(TransferChange::Deleted(Arc::clone(&removed)));
        Ok(removed)
    }

    pub fn get(&self, id: TransferId) -> Option<Arc<TransferEvent>> {
        self.transfers.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Copies the current transfers, in creation order.
    pub fn snapshot(&self) -> Vec<TransferEvent> {
        let order = self.order.read();
        order
            .iter()
            .filter_map(|id| self.transfers.get(id).map(|entry| TransferEvent::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.read().is_empty()
    }

    /// Removes every transfer, notifying subscribers once per deletion.
    pub fn clear(&self) {
        let mut order = self.order.write();
        let removed: Vec<Arc<TransferEvent>> = order
            .drain(..)
            .filter_map(|id| self.transfers.remove(&id).map(|(_, transfer)| transfer))
            .collect();
        self.transfers.clear();
        for transfer in removed {
            self.notify(TransferChange::Deleted(transfer));
        }
    }

    /// Returns a channel receiving every subsequent change to the log.
    pub fn subscribe(&self) -> Receiver<TransferChange> {
        let (sender, receiver) = channel::unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    fn notify(&self, change: TransferChange) {
        // Dropped receivers are pruned on the next send.
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

impl Default for TransferLog {
    fn default() -> Self {
        Self::new()
    }
}
