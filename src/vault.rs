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

//! External vault reconciliation.
//!
//! One designated unit (the external vault, `dis-kasa` by default) can have
//! its stock supplied by an external system instead of derived from local
//! transfers. The figures are only pulled on an explicit
//! [`ExternalVault::reconcile`]; until then, and after a
//! [`ExternalVault::reset`], the unit is derived like any other.

use crate::base::UnitId;
use crate::error::VaultError;
use crate::karat::Karat;
use crate::summary::UnitSummary;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Authoritative stock of the external vault at one karat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultStock {
    pub karat: Karat,
    pub amount: Decimal,
}

/// Where the authoritative vault figures come from.
pub trait VaultStockSource {
    /// Fetches the current per-karat stock.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unavailable`] if the source cannot be reached.
    fn fetch_stock(&self) -> Result<Vec<VaultStock>, VaultError>;
}

#[derive(Debug)]
pub struct ExternalVault {
    unit: UnitId,
    authoritative: RwLock<Option<BTreeMap<Karat, Decimal>>>,
}

impl ExternalVault {
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            authoritative: RwLock::new(None),
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Authoritative figures from the last successful reconciliation.
    pub fn authoritative(&self) -> Option<BTreeMap<Karat, Decimal>> {
        self.authoritative.read().clone()
    }

    /// Pulls the authoritative figures from `source` and replaces the
    /// previous ones in a single step.
    ///
    /// Karats the source does not report are held at zero.
    ///
    /// # Errors
    ///
    /// Propagates the source's error, or [`VaultError::NegativeStock`] if any
    /// reported figure is negative. Previously stored figures stay in place.
    pub fn reconcile(&self, source: &dyn VaultStockSource) -> Result<(), VaultError> {
        let reported = source.fetch_stock()?;

        let mut figures: BTreeMap<Karat, Decimal> =
            Karat::ALL.into_iter().map(|k| (k, Decimal::ZERO)).collect();
        for stock in reported {
            if stock.amount < Decimal::ZERO {
                return Err(VaultError::NegativeStock { karat: stock.karat });
            }
            figures.insert(stock.karat, stock.amount);
        }

        *self.authoritative.write() = Some(figures);
        Ok(())
    }

    /// Drops the authoritative figures; the unit is derived locally again.
    pub fn reset(&self) {
        *self.authoritative.write() = None;
    }

    /// Applies the authoritative figures, if any, to the vault's summary.
    ///
    /// Only stock and has-equivalent change; input and output totals keep
    /// their locally derived values. A summary is inserted if the vault has
    /// no local transfers yet.
    pub fn overlay(&self, summaries: &mut Vec<UnitSummary>) {
        let guard = self.authoritative.read();
        let Some(figures) = guard.as_ref() else {
            return;
        };

        let position = match summaries.binary_search_by_key(&self.unit, |s| s.unit) {
            Ok(position) => position,
            Err(position) => {
                summaries.insert(position, UnitSummary::empty(self.unit));
                position
            }
        };
        let summary = &mut summaries[position];
        for (karat, amount) in figures {
            summary.override_stock(*karat, *amount);
        }
    }
}
