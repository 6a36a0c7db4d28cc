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

//! # Karat Ledger
//!
//! This library tracks gold as it moves between production units, by karat,
//! and answers how much each unit holds, how much has been lost as
//! processing waste ("fire"), and what that stock is worth in pure gold
//! ("has").
//!
//! ## Core Components
//!
//! - [`compute_aggregates`]: Folds transfers into per `(unit, karat)` totals
//! - [`compute_summaries`]: Rolls aggregates up into per-unit summaries
//! - [`compute_goods_type_breakdown`]: Buckets a unit's stock by goods type
//! - [`UnitTaxonomy`]: Maps each unit to the accounting rule it follows
//! - [`Ledger`]: Transfer log plus cached projections and external vault
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use karat_ledger_rs::{Karat, Ledger, TransferEvent, TransferId, UnitId};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! let at = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
//!
//! ledger
//!     .record(TransferEvent::new(TransferId(1), UnitId::AnaKasa, UnitId::Tezgah, Karat::K14, dec!(20), at))
//!     .unwrap();
//! ledger
//!     .record(TransferEvent::new(TransferId(2), UnitId::Tezgah, UnitId::Cila, Karat::K14, dec!(18), at))
//!     .unwrap();
//!
//! // The workbench holds nothing; what it did not pass on is fire.
//! let tezgah = ledger.summary(UnitId::Tezgah).unwrap();
//! assert_eq!(tezgah.total_stock, dec!(0));
//! assert_eq!(tezgah.total_fire, dec!(2));
//! ```
//!
//! ## Recomputation
//!
//! Nothing is updated incrementally. Every projection is a pure function of
//! the full transfer list, so deleting a transfer undoes all of its effects.

pub mod aggregate;
mod base;
pub mod cache;
pub mod config;
pub mod error;
pub mod goods;
mod karat;
mod ledger;
pub mod store;
pub mod summary;
pub mod taxonomy;
mod transfer;
pub mod vault;
pub mod window;

pub use aggregate::{Aggregates, UnitKaratAggregate, compute_aggregates};
pub use base::{TransferId, UnitId, UnknownUnit};
pub use cache::AggregateCache;
pub use config::LedgerConfig;
pub use error::{ConfigError, LedgerError, VaultError};
pub use goods::{GoodsTypeAggregate, compute_goods_type_breakdown};
pub use karat::Karat;
pub use ledger::Ledger;
pub use store::{TransferChange, TransferLog};
pub use summary::{
    KaratBreakdown, KaratTotal, SystemTotals, UnitActivity, UnitSummary, compute_summaries,
    compute_totals, compute_unit_activity,
};
pub use taxonomy::{UnitCategory, UnitTaxonomy};
pub use transfer::TransferEvent;
pub use vault::{ExternalVault, VaultStock, VaultStockSource};
pub use window::DateWindow;
