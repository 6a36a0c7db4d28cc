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

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use karat_ledger_rs::{
    DateWindow, GoodsTypeAggregate, Karat, Ledger, LedgerConfig, TransferEvent, TransferId,
    UnitId, UnitSummary,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Karat Ledger - Summarize transfer CSV files
///
/// Reads transfers from a CSV file and writes per-unit stock, fire and has
/// figures to stdout.
#[derive(Parser, Debug)]
#[command(name = "karat-ledger")]
#[command(about = "Computes unit stock and fire from a transfer CSV", long_about = None)]
struct Args {
    /// Path to CSV file with transfers
    ///
    /// Expected format: id,from,to,karat,amount,timestamp,goods_type,notes
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only count transfers inside this window
    #[arg(long, value_enum, default_value_t = WindowArg::All)]
    window: WindowArg,

    /// Write the goods type breakdown of this unit instead of unit summaries
    #[arg(long, value_name = "UNIT")]
    goods_type: Option<UnitId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WindowArg {
    All,
    Today,
    Week,
    Month,
}

impl From<WindowArg> for DateWindow {
    fn from(window: WindowArg) -> Self {
        match window {
            WindowArg::All => DateWindow::All,
            WindowArg::Today => DateWindow::Today,
            WindowArg::Week => DateWindow::ThisWeek,
            WindowArg::Month => DateWindow::ThisMonth,
        }
    }
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match LedgerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => LedgerConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ledger = match Ledger::with_config(&config) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = process_transfers(BufReader::new(file), &ledger) {
        eprintln!("Error processing transfers: {}", e);
        process::exit(1);
    }

    let result = match args.goods_type {
        Some(unit) => write_goods_types(&ledger.goods_type_breakdown(unit), std::io::stdout()),
        None => {
            let summaries = ledger.windowed_summaries(args.window.into(), Utc::now());
            write_summaries(&summaries, std::io::stdout())
        }
    };
    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `id, from, to, karat, amount, timestamp, goods_type, notes`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: u64,
    from: UnitId,
    to: UnitId,
    karat: Karat,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    goods_type: Option<String>,
    notes: Option<String>,
}

impl From<CsvRecord> for TransferEvent {
    fn from(record: CsvRecord) -> Self {
        TransferEvent {
            id: TransferId(record.id),
            from_unit: record.from,
            to_unit: record.to,
            karat: record.karat,
            amount: record.amount,
            timestamp: record.timestamp,
            goods_type: record.goods_type,
            notes: record.notes,
        }
    }
}

/// Records transfers from a CSV reader into `ledger`.
///
/// Malformed rows and rejected transfers are skipped with a warning.
/// Returns the number of transfers recorded.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_transfers<R: Read>(reader: R, ledger: &Ledger) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // Trailing optional columns may be missing
        .has_headers(true)
        .from_reader(reader);

    let mut recorded = 0;
    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if e.is_io_error() {
                    return Err(e);
                }
                tracing::warn!(row = row + 1, error = %e, "skipping malformed row");
                continue;
            }
        };

        let transfer = TransferEvent::from(record);
        let id = transfer.id;
        match ledger.record(transfer) {
            Ok(()) => recorded += 1,
            Err(e) => tracing::warn!(%id, error = %e, "skipping transfer"),
        }
    }

    Ok(recorded)
}

/// Writes unit summaries as CSV.
///
/// Columns: `unit, total_stock, total_fire, has_equivalent, last_update`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_summaries<W: Write>(summaries: &[UnitSummary], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct GoodsTypeRow<'a> {
    goods_type: &'a str,
    stock: Decimal,
    fire: Decimal,
    has_equivalent: Decimal,
}

/// Writes a goods type breakdown as CSV.
///
/// Columns: `goods_type, stock, fire, has_equivalent`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_goods_types<W: Write>(
    breakdown: &[GoodsTypeAggregate],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for goods in breakdown {
        wtr.serialize(GoodsTypeRow {
            goods_type: &goods.goods_type,
            stock: goods.stock.round_dp(UnitSummary::DECIMAL_PRECISION),
            fire: goods.fire.round_dp(UnitSummary::DECIMAL_PRECISION),
            has_equivalent: goods.has_equivalent.round_dp(UnitSummary::DECIMAL_PRECISION),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
