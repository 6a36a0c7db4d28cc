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

//! Summary projection.
//!
//! Rolls the per `(unit, karat)` aggregates up into one [`UnitSummary`] per
//! unit, and unit summaries up into [`SystemTotals`].

use crate::aggregate::{Aggregates, UnitKaratAggregate, compute_aggregates};
use crate::base::UnitId;
use crate::karat::Karat;
use crate::taxonomy::UnitTaxonomy;
use crate::transfer::TransferEvent;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

/// Figures of one unit at one karat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KaratBreakdown {
    pub total_input: Decimal,
    pub total_output: Decimal,
    pub current_stock: Decimal,
    pub fire: Decimal,
    pub has_equivalent: Decimal,
}

impl From<&UnitKaratAggregate> for KaratBreakdown {
    fn from(aggregate: &UnitKaratAggregate) -> Self {
        Self {
            total_input: aggregate.total_input,
            total_output: aggregate.total_output,
            current_stock: aggregate.current_stock,
            fire: aggregate.fire,
            has_equivalent: aggregate.has_equivalent(),
        }
    }
}

/// Per-unit roll-up across all karats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
    pub unit: UnitId,
    pub total_stock: Decimal,
    pub total_fire: Decimal,
    pub has_equivalent: Decimal,
    pub by_karat: BTreeMap<Karat, KaratBreakdown>,
    /// Timestamp of the latest transfer touching the unit.
    pub last_update: Option<DateTime<Utc>>,
}

impl UnitSummary {
    pub const DECIMAL_PRECISION: u32 = 3;

    pub(crate) fn empty(unit: UnitId) -> Self {
        Self {
            unit,
            total_stock: Decimal::ZERO,
            total_fire: Decimal::ZERO,
            has_equivalent: Decimal::ZERO,
            by_karat: BTreeMap::new(),
            last_update: None,
        }
    }

    /// Breakdown at `karat`, zeroed if the unit never saw that karat.
    pub fn karat(&self, karat: Karat) -> KaratBreakdown {
        self.by_karat.get(&karat).copied().unwrap_or_default()
    }

    /// Replaces the stock held at `karat`, keeping input/output bookkeeping.
    pub(crate) fn override_stock(&mut self, karat: Karat, stock: Decimal) {
        let breakdown = self.by_karat.entry(karat).or_default();
        breakdown.current_stock = stock;
        breakdown.fire = Decimal::ZERO;
        breakdown.has_equivalent = karat.has_equivalent(stock);
        self.recompute_totals();
    }

    fn recompute_totals(&mut self) {
        self.total_stock = self.by_karat.values().map(|b| b.current_stock).sum();
        self.total_fire = self.by_karat.values().map(|b| b.fire).sum();
        self.has_equivalent = self.by_karat.values().map(|b| b.has_equivalent).sum();
    }
}

impl Serialize for UnitSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("UnitSummary", 5)?;
        state.serialize_field("unit", &self.unit)?;
        state.serialize_field(
            "total_stock",
            &self.total_stock.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "total_fire",
            &self.total_fire.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "has_equivalent",
            &self.has_equivalent.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field("last_update", &self.last_update)?;
        state.end()
    }
}

/// Computes one summary per unit appearing in `events`, in reporting order.
pub fn compute_summaries(events: &[TransferEvent], taxonomy: &UnitTaxonomy) -> Vec<UnitSummary> {
    summarize(&compute_aggregates(events, taxonomy), events)
}

/// Rolls precomputed aggregates up into unit summaries.
///
/// `events` must be the list the aggregates were computed from; it only
/// supplies the last update timestamps.
pub fn summarize(aggregates: &Aggregates, events: &[TransferEvent]) -> Vec<UnitSummary> {
    let mut summaries: BTreeMap<UnitId, UnitSummary> = BTreeMap::new();

    for aggregate in aggregates.values() {
        let summary = summaries
            .entry(aggregate.unit)
            .or_insert_with(|| UnitSummary::empty(aggregate.unit));
        let breakdown = KaratBreakdown::from(aggregate);
        summary.total_stock += breakdown.current_stock;
        summary.total_fire += breakdown.fire;
        summary.has_equivalent += breakdown.has_equivalent;
        summary.by_karat.insert(aggregate.karat, breakdown);
    }

    for event in events {
        for unit in [event.from_unit, event.to_unit] {
            if let Some(summary) = summaries.get_mut(&unit) {
                if summary.last_update.is_none_or(|last| event.timestamp > last) {
                    summary.last_update = Some(event.timestamp);
                }
            }
        }
    }

    summaries.into_values().collect()
}

/// System-wide stock at one karat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KaratTotal {
    pub karat: Karat,
    pub stock: Decimal,
    pub has_equivalent: Decimal,
    /// Share of the system-wide stock, in percent.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTotals {
    pub total_stock: Decimal,
    pub total_fire: Decimal,
    pub has_equivalent: Decimal,
    /// One entry per karat, including karats with no stock.
    pub by_karat: Vec<KaratTotal>,
}

/// Sums unit summaries into system-wide totals.
pub fn compute_totals(summaries: &[UnitSummary]) -> SystemTotals {
    let total_stock: Decimal = summaries.iter().map(|s| s.total_stock).sum();
    let total_fire: Decimal = summaries.iter().map(|s| s.total_fire).sum();
    let has_equivalent: Decimal = summaries.iter().map(|s| s.has_equivalent).sum();

    let by_karat = Karat::ALL
        .into_iter()
        .map(|karat| {
            let (stock, has) = summaries
                .iter()
                .map(|s| s.karat(karat))
                .fold((Decimal::ZERO, Decimal::ZERO), |(stock, has), b| {
                    (stock + b.current_stock, has + b.has_equivalent)
                });
            let percentage = if total_stock > Decimal::ZERO {
                stock / total_stock * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };
            KaratTotal {
                karat,
                stock,
                has_equivalent: has,
                percentage,
            }
        })
        .collect();

    SystemTotals {
        total_stock,
        total_fire,
        has_equivalent,
        by_karat,
    }
}

/// Raw movement through one unit, independent of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitActivity {
    pub unit: UnitId,
    /// Grams received.
    pub incoming: Decimal,
    /// Grams sent.
    pub outgoing: Decimal,
    /// Number of transfers touching the unit.
    pub transfers: usize,
}

pub fn compute_unit_activity(events: &[TransferEvent], unit: UnitId) -> UnitActivity {
    let mut activity = UnitActivity {
        unit,
        incoming: Decimal::ZERO,
        outgoing: Decimal::ZERO,
        transfers: 0,
    };
    for event in events.iter().filter(|e| e.touches(unit)) {
        activity.transfers += 1;
        if event.to_unit == unit {
            activity.incoming += event.amount;
        }
        if event.from_unit == unit {
            activity.outgoing += event.amount;
        }
    }
    activity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TransferId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 10, minute, 0).unwrap()
    }

    fn transfer(id: u64, from: UnitId, to: UnitId, karat: Karat, amount: Decimal) -> TransferEvent {
        TransferEvent::new(TransferId(id), from, to, karat, amount, at(id as u32))
    }

    #[test]
    fn empty_input_yields_no_summaries() {
        assert!(compute_summaries(&[], &UnitTaxonomy::default()).is_empty());
    }

    #[test]
    fn summary_sums_across_karats() {
        let events = [
            transfer(1, UnitId::Dokum, UnitId::AnaKasa, Karat::K14, dec!(100)),
            transfer(2, UnitId::Dokum, UnitId::AnaKasa, Karat::K22, dec!(50)),
        ];
        let summaries = compute_summaries(&events, &UnitTaxonomy::default());
        let kasa = summaries.iter().find(|s| s.unit == UnitId::AnaKasa).unwrap();

        assert_eq!(kasa.total_stock, dec!(150));
        assert_eq!(kasa.total_fire, Decimal::ZERO);
        assert_eq!(kasa.has_equivalent, dec!(58.3) + dec!(45.85));
        assert_eq!(kasa.karat(Karat::K14).current_stock, dec!(100));
        assert_eq!(kasa.karat(Karat::K18), KaratBreakdown::default());
    }

    #[test]
    fn summaries_follow_reporting_order() {
        let events = [
            transfer(1, UnitId::AnaKasa, UnitId::Satis, Karat::K14, dec!(1)),
            transfer(2, UnitId::Dokum, UnitId::Yarimamul, Karat::K14, dec!(1)),
        ];
        let units: Vec<_> = compute_summaries(&events, &UnitTaxonomy::default())
            .into_iter()
            .map(|s| s.unit)
            .collect();
        assert_eq!(
            units,
            vec![UnitId::AnaKasa, UnitId::Yarimamul, UnitId::Dokum, UnitId::Satis]
        );
    }

    #[test]
    fn last_update_is_latest_touching_transfer() {
        let events = [
            transfer(5, UnitId::AnaKasa, UnitId::Tezgah, Karat::K14, dec!(10)),
            transfer(2, UnitId::Dokum, UnitId::AnaKasa, Karat::K14, dec!(10)),
        ];
        let summaries = compute_summaries(&events, &UnitTaxonomy::default());
        let kasa = summaries.iter().find(|s| s.unit == UnitId::AnaKasa).unwrap();
        let dokum = summaries.iter().find(|s| s.unit == UnitId::Dokum).unwrap();

        assert_eq!(kasa.last_update, Some(at(5)));
        assert_eq!(dokum.last_update, Some(at(2)));
    }

    #[test]
    fn override_stock_recomputes_totals() {
        let events = [transfer(1, UnitId::AnaKasa, UnitId::DisKasa, Karat::K18, dec!(40))];
        let mut summaries = compute_summaries(&events, &UnitTaxonomy::default());
        let vault = summaries.iter_mut().find(|s| s.unit == UnitId::DisKasa).unwrap();

        vault.override_stock(Karat::K18, dec!(100));

        assert_eq!(vault.total_stock, dec!(100));
        assert_eq!(vault.has_equivalent, dec!(75));
        assert_eq!(vault.karat(Karat::K18).total_input, dec!(40));
    }

    #[test]
    fn totals_include_every_karat_with_percentages() {
        let events = [
            transfer(1, UnitId::Dokum, UnitId::AnaKasa, Karat::K14, dec!(30)),
            transfer(2, UnitId::Tedarik, UnitId::AnaKasa, Karat::K24, dec!(10)),
            transfer(3, UnitId::AnaKasa, UnitId::Tezgah, Karat::K14, dec!(10)),
            transfer(4, UnitId::Tezgah, UnitId::Yarimamul, Karat::K14, dec!(9)),
        ];
        let summaries = compute_summaries(&events, &UnitTaxonomy::default());
        let totals = compute_totals(&summaries);

        // Input units carry the negative mirror of what they introduced.
        assert_eq!(totals.total_stock, dec!(-1));
        assert_eq!(totals.total_fire, dec!(1));
        assert_eq!(totals.by_karat.len(), 4);
        assert_eq!(totals.by_karat[1].stock, Decimal::ZERO);
        assert_eq!(totals.by_karat[1].percentage, Decimal::ZERO);
    }

    #[test]
    fn percentages_split_positive_stock() {
        let summaries = vec![UnitSummary {
            unit: UnitId::AnaKasa,
            total_stock: dec!(40),
            total_fire: Decimal::ZERO,
            has_equivalent: dec!(33.32),
            by_karat: BTreeMap::from([
                (
                    Karat::K14,
                    KaratBreakdown {
                        current_stock: dec!(10),
                        has_equivalent: dec!(5.83),
                        ..KaratBreakdown::default()
                    },
                ),
                (
                    Karat::K18,
                    KaratBreakdown {
                        current_stock: dec!(30),
                        has_equivalent: dec!(22.5),
                        ..KaratBreakdown::default()
                    },
                ),
            ]),
            last_update: None,
        }];
        let totals = compute_totals(&summaries);

        assert_eq!(totals.by_karat[0].percentage, dec!(25));
        assert_eq!(totals.by_karat[1].percentage, dec!(75));
    }

    #[test]
    fn unit_activity_counts_both_directions() {
        let events = [
            transfer(1, UnitId::AnaKasa, UnitId::Tezgah, Karat::K14, dec!(20)),
            transfer(2, UnitId::Tezgah, UnitId::Cila, Karat::K14, dec!(18)),
            transfer(3, UnitId::Dokum, UnitId::AnaKasa, Karat::K14, dec!(5)),
        ];
        let activity = compute_unit_activity(&events, UnitId::Tezgah);

        assert_eq!(activity.incoming, dec!(20));
        assert_eq!(activity.outgoing, dec!(18));
        assert_eq!(activity.transfers, 2);
    }

    #[test]
    fn serializer_rounds_to_three_decimal_places() {
        let summary = UnitSummary {
            unit: UnitId::AnaKasa,
            total_stock: dec!(12.34567),
            total_fire: dec!(0.0004),
            has_equivalent: dec!(7.19752),
            by_karat: BTreeMap::new(),
            last_update: None,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["unit"], "ana-kasa");
        assert_eq!(parsed["total_stock"].as_str().unwrap(), "12.346");
        assert_eq!(parsed["total_fire"].as_str().unwrap(), "0.000");
        assert_eq!(parsed["has_equivalent"].as_str().unwrap(), "7.198");
        assert!(parsed["last_update"].is_null());
    }
}
