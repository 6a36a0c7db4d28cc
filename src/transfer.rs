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

//! Transfer events.
//!
//! A transfer is an immutable record of material moved from one unit to
//! another. Transfers are never edited; removing one from the log undoes
//! all of its effects on the next recomputation.

use crate::base::{TransferId, UnitId};
use crate::error::LedgerError;
use crate::karat::Karat;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferEvent {
    pub id: TransferId,
    pub from_unit: UnitId,
    pub to_unit: UnitId,
    pub karat: Karat,
    /// Grams moved. Positive once validated.
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Optional free-text sub-classification ("cinsi").
    #[serde(default)]
    pub goods_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransferEvent {
    pub fn new(
        id: TransferId,
        from_unit: UnitId,
        to_unit: UnitId,
        karat: Karat,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            from_unit,
            to_unit,
            karat,
            amount,
            timestamp,
            goods_type: None,
            notes: None,
        }
    }

    pub fn with_goods_type(mut self, goods_type: impl Into<String>) -> Self {
        self.goods_type = Some(goods_type.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether `unit` is the source or the destination of this transfer.
    pub fn touches(&self, unit: UnitId) -> bool {
        self.from_unit == unit || self.to_unit == unit
    }

    /// Checks the event before it enters the log.
    ///
    /// Self-transfers are accepted; they net to zero downstream.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the amount is zero or negative.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(())
    }
}
