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

//! Reporting windows over transfer timestamps.

use crate::transfer::TransferEvent;
use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, TimeZone, Utc};

/// A time range used to restrict which transfers a report looks at.
///
/// Calendar windows are evaluated in UTC and weeks start on Monday. Both
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    All,
    Today,
    ThisWeek,
    ThisMonth,
    /// The trailing `n` days up to `now`.
    LastDays(u32),
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl DateWindow {
    /// Resolves the window into concrete bounds relative to `now`.
    ///
    /// Returns `None` for [`DateWindow::All`].
    pub fn bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        match *self {
            DateWindow::All => None,
            DateWindow::Today => Some((start_of(today), end_of(today))),
            DateWindow::ThisWeek => {
                let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
                Some((start_of(monday), end_of(monday + Days::new(6))))
            }
            DateWindow::ThisMonth => {
                let first = today.with_day(1)?;
                let next = first.checked_add_months(chrono::Months::new(1))?;
                Some((start_of(first), end_of(next.pred_opt()?)))
            }
            DateWindow::LastDays(days) => Some((now - Duration::days(i64::from(days)), now)),
            DateWindow::Custom { start, end } => Some((start, end)),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.bounds(now) {
            None => true,
            Some((start, end)) => start <= timestamp && timestamp <= end,
        }
    }

    /// Transfers inside the window, in their original order.
    pub fn filter(&self, events: &[TransferEvent], now: DateTime<Utc>) -> Vec<TransferEvent> {
        match self.bounds(now) {
            None => events.to_vec(),
            Some((start, end)) => events
                .iter()
                .filter(|e| start <= e.timestamp && e.timestamp <= end)
                .cloned()
                .collect(),
        }
    }
}

fn start_of(day: chrono::NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

fn end_of(day: chrono::NaiveDate) -> DateTime<Utc> {
    start_of(day) + Duration::days(1) - Duration::nanoseconds(1)
}
