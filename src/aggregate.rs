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

//! Ledger aggregation.
//!
//! Folds the full list of transfers into per `(unit, karat)` totals and then
//! derives stock and fire according to the unit's category:
//!
//! | Category | Stock | Fire |
//! |----------|-------|------|
//! | Standard | input - output | 0 |
//! | FireTracking | 0 | input - output |
//! | Processing | 0 | input - output |
//! | InputOnly | input - output | 0 |
//! | OutputOnly | output | 0 |
//! | SemiFinished | input - output | 0 |
//!
//! Output-only units never accrue input. Material they receive leaves the
//! system, so it is booked as their output and that output is their stock.
//!
//! There is no incremental update path: every call replays the whole list.

use crate::base::UnitId;
use crate::karat::Karat;
use crate::taxonomy::{UnitCategory, UnitTaxonomy};
use crate::transfer::TransferEvent;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates keyed by unit then karat, in reporting order.
pub type Aggregates = BTreeMap<(UnitId, Karat), UnitKaratAggregate>;

/// Running totals and derived figures for one unit at one karat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitKaratAggregate {
    pub unit: UnitId,
    pub karat: Karat,
    pub total_input: Decimal,
    pub total_output: Decimal,
    pub current_stock: Decimal,
    pub fire: Decimal,
}

impl UnitKaratAggregate {
    fn new(unit: UnitId, karat: Karat) -> Self {
        Self {
            unit,
            karat,
            total_input: Decimal::ZERO,
            total_output: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            fire: Decimal::ZERO,
        }
    }

    /// Pure gold equivalent of the derived stock.
    pub fn has_equivalent(&self) -> Decimal {
        self.karat.has_equivalent(self.current_stock)
    }

    fn derive(&mut self, category: UnitCategory) {
        let net = self.total_input - self.total_output;
        let (stock, fire) = match category {
            UnitCategory::Standard | UnitCategory::InputOnly | UnitCategory::SemiFinished => {
                (net, Decimal::ZERO)
            }
            UnitCategory::FireTracking | UnitCategory::Processing => (Decimal::ZERO, net),
            UnitCategory::OutputOnly => (self.total_output, Decimal::ZERO),
        };
        self.current_stock = stock;
        self.fire = fire;
    }
}

/// Computes the aggregate of every `(unit, karat)` pair that appears as the
/// source or destination of at least one transfer.
///
/// Amounts are taken as given; validation belongs to whoever records the
/// transfers. An empty list yields an empty map.
pub fn compute_aggregates(events: &[TransferEvent], taxonomy: &UnitTaxonomy) -> Aggregates {
    let mut aggregates = Aggregates::new();

    for event in events {
        let source = aggregates
            .entry((event.from_unit, event.karat))
            .or_insert_with(|| UnitKaratAggregate::new(event.from_unit, event.karat));
        source.total_output += event.amount;

        let destination = aggregates
            .entry((event.to_unit, event.karat))
            .or_insert_with(|| UnitKaratAggregate::new(event.to_unit, event.karat));
        match taxonomy.category_of(event.to_unit) {
            UnitCategory::OutputOnly => destination.total_output += event.amount,
            _ => destination.total_input += event.amount,
        }
    }

    for aggregate in aggregates.values_mut() {
        aggregate.derive(taxonomy.category_of(aggregate.unit));
    }

    aggregates
}
