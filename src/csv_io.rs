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

//! CSV source and sink for debt and settlement rows.
//!
//! Both directions use headerless 3-field rows:
//!
//! ```csv
//! Jacek,Dominik,10
//! Michał,Kamil,13
//! ```
//!
//! Input rows are `receiver, payer, amount`; output rows are
//! `debtor, creditor, amount`. Amounts are decimal integers.

use crate::error::DataError;
use crate::planner::settle_debts;
use crate::record::SettlementRecord;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Reads raw rows from CSV data.
///
/// Fields are kept verbatim, so `" A"` and `A` are different participants.
/// Rows may have any arity; shape and amount checks
/// happen during aggregation so errors can name the offending row.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the data is not valid CSV.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    rdr.records()
        .map(|record| record.map(|record| record.iter().map(str::to_owned).collect()))
        .collect()
}

/// Writes settlements as headerless `debtor,creditor,amount` rows.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_settlements<W: Write>(
    writer: W,
    settlements: &[SettlementRecord],
) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    for settlement in settlements {
        wtr.serialize(settlement)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Reads debt rows, settles them and writes the settlements.
///
/// Returns the number of settlements written.
///
/// # Errors
///
/// Any CSV, I/O or netting error. Nothing is written if the rows are invalid.
pub fn settle_csv<R: Read, W: Write>(reader: R, writer: W) -> Result<usize, DataError> {
    let rows = read_records(reader)?;
    let settlements = settle_debts(&rows)?;
    write_settlements(writer, &settlements)?;

    debug!(
        rows = rows.len(),
        settlements = settlements.len(),
        "settled CSV batch"
    );
    Ok(settlements.len())
}

/// Reads debt rows from a file.
///
/// # Errors
///
/// - [`DataError::NotFound`] - The file does not exist.
/// - [`DataError::PermissionDenied`] - The file cannot be read.
/// - [`DataError::Csv`] - The file is not valid CSV.
pub fn read_file(path: &Path) -> Result<Vec<Vec<String>>, DataError> {
    let file = File::open(path).map_err(|e| file_error(path, e))?;
    Ok(read_records(BufReader::new(file))?)
}

/// Writes settlements to a file, creating or truncating it.
///
/// # Errors
///
/// - [`DataError::NotFound`] - The parent directory does not exist.
/// - [`DataError::PermissionDenied`] - The file cannot be written.
/// - [`DataError::Csv`] - Writing a row failed.
pub fn save_file(path: &Path, settlements: &[SettlementRecord]) -> Result<(), DataError> {
    let file = File::create(path).map_err(|e| file_error(path, e))?;
    write_settlements(BufWriter::new(file), settlements)?;
    Ok(())
}

fn file_error(path: &Path, error: io::Error) -> DataError {
    match error.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DataError::PermissionDenied(path.to_path_buf()),
        _ => DataError::Io(error),
    }
}
