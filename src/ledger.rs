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

//! Ledger facade.
//!
//! The [`Ledger`] owns the transfer log and answers every stock question
//! from it. It records and deletes transfers, and on every query recomputes
//! the projections from a snapshot of the full log.
//!
//! # Derived state
//!
//! - **Aggregates**: per `(unit, karat)` totals, memoized by [`AggregateCache`].
//! - **Summaries**: per unit roll-ups, with the external vault overlaid.
//! - **Totals**: system-wide stock, fire and has per karat.
//! - **Goods type breakdown**: per unit buckets by goods type.
//!
//! # Thread Safety
//!
//! The log accepts concurrent writers. Each query works on its own snapshot
//! and never sees a transfer half-recorded.

use crate::aggregate::{Aggregates, compute_aggregates};
use crate::base::{TransferId, UnitId};
use crate::cache::AggregateCache;
use crate::config::LedgerConfig;
use crate::error::{ConfigError, LedgerError};
use crate::goods::{GoodsTypeAggregate, compute_goods_type_breakdown};
use crate::store::{TransferChange, TransferLog};
use crate::summary::{
    SystemTotals, UnitActivity, UnitSummary, compute_summaries, compute_totals,
    compute_unit_activity, summarize,
};
use crate::taxonomy::UnitTaxonomy;
use crate::transfer::TransferEvent;
use crate::vault::{ExternalVault, VaultStockSource};
use crate::window::DateWindow;
use chrono::{DateTime, Utc};
use crossbeam::channel::Receiver;
use std::sync::Arc;

/// Stock and fire ledger over a transfer log.
///
/// # Invariants
///
/// - Transfer IDs are unique across the log.
/// - Every recorded transfer has a positive amount.
/// - Derived figures are a function of the current log alone, except for
///   the external vault's stock after an explicit reconciliation.
pub struct Ledger {
    transfers: TransferLog,
    taxonomy: UnitTaxonomy,
    cache: AggregateCache,
    vault: ExternalVault,
}

impl Ledger {
    /// Creates a ledger with the default taxonomy and no transfers.
    pub fn new() -> Self {
        Self::with_taxonomy(UnitTaxonomy::default())
    }

    pub fn with_taxonomy(taxonomy: UnitTaxonomy) -> Self {
        Ledger {
            transfers: TransferLog::new(),
            taxonomy,
            cache: AggregateCache::default(),
            vault: ExternalVault::new(UnitId::DisKasa),
        }
    }

    /// Creates a ledger from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverlappingCategory`] if the configured
    /// taxonomy assigns a unit twice.
    pub fn with_config(config: &LedgerConfig) -> Result<Self, ConfigError> {
        Ok(Ledger {
            transfers: TransferLog::new(),
            taxonomy: config.unit_taxonomy()?,
            cache: AggregateCache::new(config.cache.capacity),
            vault: ExternalVault::new(config.vault.unit),
        })
    }

    pub fn taxonomy(&self) -> &UnitTaxonomy {
        &self.taxonomy
    }

    pub fn vault(&self) -> &ExternalVault {
        &self.vault
    }

    /// Validates and appends a transfer.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - Amount is zero or negative.
    /// - [`LedgerError::DuplicateTransfer`] - Transfer ID already exists.
    pub fn record(&self, transfer: TransferEvent) -> Result<(), LedgerError> {
        transfer.validate()?;
        let transfer = self.transfers.push(transfer)?;
        tracing::info!(
            id = %transfer.id,
            from = %transfer.from_unit,
            to = %transfer.to_unit,
            karat = %transfer.karat,
            amount = %transfer.amount,
            "transfer recorded"
        );
        Ok(())
    }

    /// Deletes a transfer. Its effects disappear from the next query.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TransferNotFound`] if no transfer has this ID.
    pub fn delete(&self, id: TransferId) -> Result<TransferEvent, LedgerError> {
        let removed = self.transfers.remove(id)?;
        tracing::info!(%id, "transfer deleted");
        Ok(TransferEvent::clone(&removed))
    }

    /// Deletes every transfer.
    pub fn clear(&self) {
        self.transfers.clear();
        self.cache.clear();
        tracing::info!("transfer log cleared");
    }

    /// Snapshot of the transfer log, in creation order.
    pub fn transfers(&self) -> Vec<TransferEvent> {
        self.transfers.snapshot()
    }

    /// Receives every subsequent record and delete.
    pub fn subscribe(&self) -> Receiver<TransferChange> {
        self.transfers.subscribe()
    }

    /// Per `(unit, karat)` aggregates of the current log.
    pub fn aggregates(&self) -> Arc<Aggregates> {
        self.aggregates_of(&self.transfers.snapshot())
    }

    fn aggregates_of(&self, events: &[TransferEvent]) -> Arc<Aggregates> {
        self.cache.get_or_compute(events, |events| {
            tracing::debug!(transfers = events.len(), "recomputing aggregates");
            compute_aggregates(events, &self.taxonomy)
        })
    }

    /// Per unit summaries of the current log, with the external vault's
    /// reconciled stock applied.
    pub fn summaries(&self) -> Vec<UnitSummary> {
        let events = self.transfers.snapshot();
        let mut summaries = summarize(&self.aggregates_of(&events), &events);
        self.vault.overlay(&mut summaries);
        summaries
    }

    pub fn summary(&self, unit: UnitId) -> Option<UnitSummary> {
        self.summaries().into_iter().find(|s| s.unit == unit)
    }

    /// Summaries over the transfers inside `window`.
    ///
    /// The external vault's reconciled stock is a point-in-time figure and
    /// is applied regardless of the window.
    pub fn windowed_summaries(&self, window: DateWindow, now: DateTime<Utc>) -> Vec<UnitSummary> {
        let events = window.filter(&self.transfers.snapshot(), now);
        let mut summaries = compute_summaries(&events, &self.taxonomy);
        self.vault.overlay(&mut summaries);
        summaries
    }

    /// System-wide totals across every unit.
    pub fn totals(&self) -> SystemTotals {
        compute_totals(&self.summaries())
    }

    /// Goods type breakdown of `unit` over the full log.
    pub fn goods_type_breakdown(&self, unit: UnitId) -> Vec<GoodsTypeAggregate> {
        compute_goods_type_breakdown(&self.transfers.snapshot(), &self.taxonomy, unit)
    }

    /// Raw incoming and outgoing movement of `unit` inside `window`.
    pub fn unit_activity(
        &self,
        unit: UnitId,
        window: DateWindow,
        now: DateTime<Utc>,
    ) -> UnitActivity {
        compute_unit_activity(&window.filter(&self.transfers.snapshot(), now), unit)
    }

    /// Pulls the external vault's authoritative stock from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VaultUnavailable`] if the source fails; the
    /// previously applied figures stay in place.
    pub fn reconcile_vault(&self, source: &dyn VaultStockSource) -> Result<(), LedgerError> {
        match self.vault.reconcile(source) {
            Ok(()) => {
                tracing::info!(unit = %self.vault.unit(), "external vault reconciled");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(unit = %self.vault.unit(), %error, "external vault reconciliation failed");
                Err(error.into())
            }
        }
    }

    /// Reverts the external vault to locally derived stock.
    pub fn reset_vault(&self) {
        self.vault.reset();
        tracing::info!(unit = %self.vault.unit(), "external vault reset to local figures");
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
