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

//! Configuration loading.
//!
//! The ledger reads an optional TOML file:
//!
//! ```toml
//! log_filter = "info"
//!
//! [taxonomy]
//! fire_tracking = ["lazer-kesim"]
//! processing = ["tezgah", "cila"]
//! input_only = ["dokum", "tedarik"]
//! output_only = ["satis"]
//! semi_finished = ["yarimamul"]
//!
//! [cache]
//! capacity = 10
//!
//! [vault]
//! unit = "dis-kasa"
//! ```
//!
//! Every section is optional and falls back to the built-in defaults. A
//! `[taxonomy]` section replaces the default taxonomy as a whole: lists it
//! leaves out are empty, and units it does not list are standard.

use crate::base::UnitId;
use crate::cache::AggregateCache;
use crate::error::ConfigError;
use crate::taxonomy::{UnitCategory, UnitTaxonomy};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            taxonomy: TaxonomyConfig::default(),
            cache: CacheConfig::default(),
            vault: VaultConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a unit
    /// is listed under more than one category.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Same as [`LedgerConfig::from_file`], minus I/O.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.taxonomy.build()?;
        Ok(config)
    }

    /// The taxonomy described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverlappingCategory`] for a unit listed twice.
    pub fn unit_taxonomy(&self) -> Result<UnitTaxonomy, ConfigError> {
        self.taxonomy.build()
    }
}

/// Units assigned to each non-standard category. Unlisted units are
/// [`UnitCategory::Standard`].
///
/// [`Default`] is the built-in taxonomy and applies only when the section is
/// missing; inside the section an omitted list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default)]
    pub fire_tracking: Vec<UnitId>,
    #[serde(default)]
    pub processing: Vec<UnitId>,
    #[serde(default)]
    pub input_only: Vec<UnitId>,
    #[serde(default)]
    pub output_only: Vec<UnitId>,
    #[serde(default)]
    pub semi_finished: Vec<UnitId>,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        let taxonomy = UnitTaxonomy::default();
        let members =
            |category: UnitCategory| -> Vec<UnitId> { taxonomy.units_in(category).collect() };
        Self {
            fire_tracking: members(UnitCategory::FireTracking),
            processing: members(UnitCategory::Processing),
            input_only: members(UnitCategory::InputOnly),
            output_only: members(UnitCategory::OutputOnly),
            semi_finished: members(UnitCategory::SemiFinished),
        }
    }
}

impl TaxonomyConfig {
    fn build(&self) -> Result<UnitTaxonomy, ConfigError> {
        let lists = [
            (UnitCategory::FireTracking, &self.fire_tracking),
            (UnitCategory::Processing, &self.processing),
            (UnitCategory::InputOnly, &self.input_only),
            (UnitCategory::OutputOnly, &self.output_only),
            (UnitCategory::SemiFinished, &self.semi_finished),
        ];

        let mut assigned = [false; UnitId::COUNT];
        let mut taxonomy = UnitTaxonomy::all_standard();
        for (category, units) in lists {
            for &unit in units {
                if std::mem::replace(&mut assigned[unit.index()], true) {
                    return Err(ConfigError::OverlappingCategory { unit });
                }
                taxonomy = taxonomy.with(unit, category);
            }
        }
        Ok(taxonomy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of memoized aggregation results.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: AggregateCache::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// The unit whose stock may be reconciled from an external source.
    pub unit: UnitId,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            unit: UnitId::DisKasa,
        }
    }
}
