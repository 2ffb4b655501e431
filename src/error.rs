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

//! Error types for netting, record I/O and the job worker.

use crate::base::{Amount, Participant};
use std::path::PathBuf;
use thiserror::Error;

/// A debt record batch was rejected during aggregation.
///
/// `row` is the zero-based position of the offending record in its batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record does not have exactly receiver, payer and amount
    #[error("row {row}: expected 3 fields (receiver, payer, amount), found {found}")]
    FieldCount { row: usize, found: usize },

    /// Amount is not a decimal integer
    #[error("row {row}: amount {value:?} is not an integer")]
    InvalidAmount { row: usize, value: String },

    /// Debt amounts cannot be negative
    #[error("row {row}: amount {amount} is negative")]
    NegativeAmount { row: usize, amount: Amount },

    /// Running balance left the representable range
    #[error("row {row}: balance of {participant} overflows")]
    AmountOverflow { row: usize, participant: Participant },
}

/// Netting failures surfaced by [`plan`](crate::plan) and [`settle_debts`](crate::settle_debts).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Balance handed to the planner does not sum to zero
    #[error("balances sum to {total}, expected 0")]
    InvariantViolation { total: i128 },
}

/// Errors reading debt records from, or writing settlements to, CSV data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Settle(#[from] SettleError),
}

/// Errors raised while processing a queued settlement job.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("malformed job message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("queue error: {0}")]
    Queue(#[source] std::io::Error),

    #[error("object {key:?} not found in bucket {bucket:?}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("object store error for {key:?}: {source}")]
    Store {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

#[cfg(test)]
mod tests {
    use super::{SettleError, ValidationError};
    use crate::Participant;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            ValidationError::FieldCount { row: 2, found: 4 }.to_string(),
            "row 2: expected 3 fields (receiver, payer, amount), found 4"
        );
        assert_eq!(
            ValidationError::InvalidAmount {
                row: 0,
                value: "ten".into()
            }
            .to_string(),
            "row 0: amount \"ten\" is not an integer"
        );
        assert_eq!(
            ValidationError::NegativeAmount { row: 1, amount: -5 }.to_string(),
            "row 1: amount -5 is negative"
        );
        assert_eq!(
            ValidationError::AmountOverflow {
                row: 3,
                participant: Participant::from("Kamil")
            }
            .to_string(),
            "row 3: balance of Kamil overflows"
        );
        assert_eq!(
            SettleError::InvariantViolation { total: 7 }.to_string(),
            "balances sum to 7, expected 0"
        );
    }

    #[test]
    fn validation_converts_transparently() {
        let err: SettleError = ValidationError::FieldCount { row: 0, found: 1 }.into();
        assert_eq!(
            err.to_string(),
            "row 0: expected 3 fields (receiver, payer, amount), found 1"
        );
        assert_eq!(err.clone(), err);
    }
}
