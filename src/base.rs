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

//! Core identifier types for production units and transfers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a transfer event.
///
/// Wraps a `u64`. Transfer IDs must be unique across the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A production unit: a physical vault, a workstation, or a virtual
/// boundary unit such as sales.
///
/// The declaration order is the reporting order used by every projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitId {
    AnaKasa,
    Yarimamul,
    LazerKesim,
    Tezgah,
    Cila,
    Dokum,
    Tedarik,
    DisKasa,
    Satis,
}

impl UnitId {
    pub const COUNT: usize = 9;

    /// Every unit, in reporting order.
    pub const ALL: [UnitId; UnitId::COUNT] = [
        UnitId::AnaKasa,
        UnitId::Yarimamul,
        UnitId::LazerKesim,
        UnitId::Tezgah,
        UnitId::Cila,
        UnitId::Dokum,
        UnitId::Tedarik,
        UnitId::DisKasa,
        UnitId::Satis,
    ];

    /// Position of the unit in [`UnitId::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Identifier as it appears in CSV files and configuration.
    pub const fn slug(self) -> &'static str {
        match self {
            UnitId::AnaKasa => "ana-kasa",
            UnitId::Yarimamul => "yarimamul",
            UnitId::LazerKesim => "lazer-kesim",
            UnitId::Tezgah => "tezgah",
            UnitId::Cila => "cila",
            UnitId::Dokum => "dokum",
            UnitId::Tedarik => "tedarik",
            UnitId::DisKasa => "dis-kasa",
            UnitId::Satis => "satis",
        }
    }

    /// Human readable unit name.
    pub const fn name(self) -> &'static str {
        match self {
            UnitId::AnaKasa => "Ana Kasa",
            UnitId::Yarimamul => "Yarımamül",
            UnitId::LazerKesim => "Lazer Kesim",
            UnitId::Tezgah => "Tezgah",
            UnitId::Cila => "Cila",
            UnitId::Dokum => "Döküm",
            UnitId::Tedarik => "Tedarik",
            UnitId::DisKasa => "Dış Kasa",
            UnitId::Satis => "Satış",
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when parsing an unknown unit identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit: {0}")]
pub struct UnknownUnit(pub String);

impl FromStr for UnitId {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitId::ALL
            .into_iter()
            .find(|unit| unit.slug() == s)
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}
