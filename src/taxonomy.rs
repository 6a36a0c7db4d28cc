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

//! Unit taxonomy.
//!
//! Every production unit belongs to exactly one [`UnitCategory`], and the
//! category decides which stock/fire rule the aggregator applies to it.
//!
//! | Unit | Default category |
//! |------|------------------|
//! | ana-kasa, cila, dis-kasa | Standard |
//! | yarimamul | SemiFinished |
//! | lazer-kesim | FireTracking |
//! | tezgah | Processing |
//! | dokum, tedarik | InputOnly |
//! | satis | OutputOnly |

use crate::base::UnitId;
use serde::{Deserialize, Serialize};

/// Accounting category of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitCategory {
    /// Plain holding location. Balance is exact, no loss.
    Standard,
    /// Pass-through process step. The input/output gap is loss.
    FireTracking,
    /// Transient processing station. Holds no stock, the gap is loss.
    Processing,
    /// Introduces external material into the system.
    InputOnly,
    /// Delivers material out of the system. Its stock is what it delivered.
    OutputOnly,
    /// Tracked apart from the standard unit it feeds.
    SemiFinished,
}

impl UnitCategory {
    /// Whether the input/output gap of units in this category is loss
    /// rather than retained stock.
    pub const fn tracks_fire(self) -> bool {
        matches!(self, UnitCategory::FireTracking | UnitCategory::Processing)
    }
}

/// Static mapping from unit to category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTaxonomy {
    categories: [UnitCategory; UnitId::COUNT],
}

impl UnitTaxonomy {
    /// A taxonomy where every unit is [`UnitCategory::Standard`].
    pub fn all_standard() -> Self {
        Self {
            categories: [UnitCategory::Standard; UnitId::COUNT],
        }
    }

    /// Returns a copy of this taxonomy with `unit` moved to `category`.
    pub fn with(mut self, unit: UnitId, category: UnitCategory) -> Self {
        self.categories[unit.index()] = category;
        self
    }

    pub fn category_of(&self, unit: UnitId) -> UnitCategory {
        self.categories[unit.index()]
    }

    /// Units currently assigned to `category`, in reporting order.
    pub fn units_in(&self, category: UnitCategory) -> impl Iterator<Item = UnitId> + '_ {
        UnitId::ALL
            .into_iter()
            .filter(move |unit| self.category_of(*unit) == category)
    }
}

impl Default for UnitTaxonomy {
    fn default() -> Self {
        Self::all_standard()
            .with(UnitId::Yarimamul, UnitCategory::SemiFinished)
            .with(UnitId::LazerKesim, UnitCategory::FireTracking)
            .with(UnitId::Tezgah, UnitCategory::Processing)
            .with(UnitId::Dokum, UnitCategory::InputOnly)
            .with(UnitId::Tedarik, UnitCategory::InputOnly)
            .with(UnitId::Satis, UnitCategory::OutputOnly)
    }
}
