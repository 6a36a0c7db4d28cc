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

//! Purity grades and their pure gold ("has") conversion ratios.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fineness of the material being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Karat {
    #[serde(rename = "14K")]
    K14,
    #[serde(rename = "18K")]
    K18,
    #[serde(rename = "22K")]
    K22,
    #[serde(rename = "24K")]
    K24,
}

impl Karat {
    pub const ALL: [Karat; 4] = [Karat::K14, Karat::K18, Karat::K22, Karat::K24];

    /// Multiplier turning an amount at this grade into its pure gold mass.
    pub fn has_ratio(self) -> Decimal {
        match self {
            Karat::K14 => dec!(0.583),
            Karat::K18 => dec!(0.750),
            Karat::K22 => dec!(0.917),
            Karat::K24 => dec!(1.000),
        }
    }

    /// Pure gold equivalent of `amount` grams at this grade.
    pub fn has_equivalent(self, amount: Decimal) -> Decimal {
        amount * self.has_ratio()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Karat::K14 => "14K",
            Karat::K18 => "18K",
            Karat::K22 => "22K",
            Karat::K24 => "24K",
        }
    }
}

impl fmt::Display for Karat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
