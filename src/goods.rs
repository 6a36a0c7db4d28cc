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

//! Goods type ("cinsi") breakdown of a single unit.
//!
//! Buckets the unit's movements by the optional goods type tag on each
//! transfer, independently of karat, and applies the same stock/fire rule as
//! the aggregator. Untagged transfers are not part of any bucket.

use crate::base::UnitId;
use crate::taxonomy::{UnitCategory, UnitTaxonomy};
use crate::transfer::TransferEvent;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoodsTypeAggregate {
    pub goods_type: String,
    pub stock: Decimal,
    pub fire: Decimal,
    pub has_equivalent: Decimal,
}

#[derive(Default)]
struct Bucket {
    net: Decimal,
    net_has: Decimal,
}

/// Computes the goods type breakdown of `unit` over the full history.
///
/// Buckets that end with neither positive stock nor positive fire are
/// omitted. The result is ordered by goods type.
pub fn compute_goods_type_breakdown(
    events: &[TransferEvent],
    taxonomy: &UnitTaxonomy,
    unit: UnitId,
) -> Vec<GoodsTypeAggregate> {
    let category = taxonomy.category_of(unit);
    let mut buckets: BTreeMap<&str, Bucket> = BTreeMap::new();

    for event in events {
        let Some(goods_type) = event.goods_type.as_deref() else {
            continue;
        };
        let has = event.karat.has_equivalent(event.amount);

        if event.to_unit == unit {
            let bucket = buckets.entry(goods_type).or_default();
            bucket.net += event.amount;
            bucket.net_has += has;
        }
        if event.from_unit == unit {
            let bucket = buckets.entry(goods_type).or_default();
            // Everything an output-only unit touches has left the system.
            if category == UnitCategory::OutputOnly {
                bucket.net += event.amount;
                bucket.net_has += has;
            } else {
                bucket.net -= event.amount;
                bucket.net_has -= has;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(goods_type, bucket)| {
            let (stock, fire, has_equivalent) = if category.tracks_fire() {
                (Decimal::ZERO, bucket.net, Decimal::ZERO)
            } else {
                (bucket.net, Decimal::ZERO, bucket.net_has)
            };
            GoodsTypeAggregate {
                goods_type: goods_type.to_string(),
                stock,
                fire,
                has_equivalent,
            }
        })
        .filter(|g| g.stock > Decimal::ZERO || g.fire > Decimal::ZERO)
        .collect()
}
