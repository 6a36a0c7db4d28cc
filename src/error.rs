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

//! Error types for the ledger boundary, vault reconciliation and configuration.
//!
//! The aggregator and projectors themselves never fail; every error here
//! belongs to an operation that touches the outside world.

use crate::base::UnitId;
use crate::karat::Karat;
use thiserror::Error;

/// Errors raised when recording, deleting or reconciling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Duplicate transfer ID
    #[error("duplicate transfer ID")]
    DuplicateTransfer,

    /// Referenced transfer ID does not exist
    #[error("transfer not found")]
    TransferNotFound,

    /// The external vault source could not deliver its figures
    #[error("external vault unavailable: {0}")]
    VaultUnavailable(String),
}

/// Failures reported by an external vault stock source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("vault source unavailable: {0}")]
    Unavailable(String),

    /// The source reported a negative stock figure
    #[error("vault source reported negative stock for {karat}")]
    NegativeStock { karat: Karat },
}

impl From<VaultError> for LedgerError {
    fn from(error: VaultError) -> Self {
        LedgerError::VaultUnavailable(error.to_string())
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A unit was listed under more than one category
    #[error("unit {unit} is assigned to more than one category")]
    OverlappingCategory { unit: UnitId },
}
