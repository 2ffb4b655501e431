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

//! Debt and settlement records.
//!
//! A [`DebtRecord`] reads "payer owes receiver amount"; a [`SettlementRecord`]
//! reads "debtor pays creditor amount". Both travel as 3-field rows with the
//! amount written as decimal integer text.

use crate::base::{Amount, Participant};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A single pairwise debt: `payer` owes `receiver` the given `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub receiver: Participant,
    pub payer: Participant,
    pub amount: Amount,
}

impl DebtRecord {
    pub fn new(
        receiver: impl Into<Participant>,
        payer: impl Into<Participant>,
        amount: Amount,
    ) -> Self {
        DebtRecord {
            receiver: receiver.into(),
            payer: payer.into(),
            amount,
        }
    }

    /// Builds a record from raw `receiver, payer, amount` fields.
    ///
    /// `row` is the record's position in its batch and only feeds error reports.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::FieldCount`] - Not exactly three fields.
    /// - [`ValidationError::InvalidAmount`] - Amount is not a decimal integer.
    /// - [`ValidationError::NegativeAmount`] - Amount is below zero.
    pub fn from_fields<S: AsRef<str>>(row: usize, fields: &[S]) -> Result<Self, ValidationError> {
        let [receiver, payer, amount] = fields else {
            return Err(ValidationError::FieldCount {
                row,
                found: fields.len(),
            });
        };

        let amount = parse_amount(row, amount.as_ref())?;
        Ok(DebtRecord::new(
            AsRef::<str>::as_ref(receiver),
            AsRef::<str>::as_ref(payer),
            amount,
        ))
    }
}

/// Parses decimal integer text, ignoring surrounding whitespace.
fn parse_amount(row: usize, text: &str) -> Result<Amount, ValidationError> {
    let amount: Amount = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAmount {
            row,
            value: text.to_owned(),
        })?;

    if amount < 0 {
        return Err(ValidationError::NegativeAmount { row, amount });
    }
    Ok(amount)
}

/// A payment instruction: `debtor` pays `creditor` the given `amount`.
///
/// Always has `debtor != creditor` and `amount > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub debtor: Participant,
    pub creditor: Participant,
    pub amount: Amount,
}

impl SettlementRecord {
    pub fn new(
        debtor: impl Into<Participant>,
        creditor: impl Into<Participant>,
        amount: Amount,
    ) -> Self {
        SettlementRecord {
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_fields() {
        let record = DebtRecord::from_fields(0, &["Jacek", "Dominik", "10"]).unwrap();
        assert_eq!(record, DebtRecord::new("Jacek", "Dominik", 10));
    }

    #[test]
    fn amount_whitespace_and_plus_sign_accepted() {
        assert_eq!(DebtRecord::from_fields(0, &["A", "B", " 7 "]).unwrap().amount, 7);
        assert_eq!(DebtRecord::from_fields(0, &["A", "B", "+7"]).unwrap().amount, 7);
    }

    #[test]
    fn zero_amount_accepted() {
        assert_eq!(DebtRecord::from_fields(0, &["A", "B", "0"]).unwrap().amount, 0);
    }

    #[test]
    fn rejects_non_integer_amounts() {
        for bad in ["ten", "", "1.5", "1,000", "1e3", "99999999999999999999"] {
            let err = DebtRecord::from_fields(4, &["A", "B", bad]).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidAmount {
                    row: 4,
                    value: bad.to_owned()
                }
            );
        }
    }

    #[test]
    fn rejects_negative_amount() {
        let err = DebtRecord::from_fields(1, &["A", "B", "-3"]).unwrap_err();
        assert_eq!(err, ValidationError::NegativeAmount { row: 1, amount: -3 });
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = DebtRecord::from_fields(2, &["A", "B"]).unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { row: 2, found: 2 });

        let err = DebtRecord::from_fields(0, &["A", "B", "1", "extra"]).unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { row: 0, found: 4 });
    }
}
