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

//! Net balance aggregation.
//!
//! A [`Balance`] folds a batch of [`DebtRecord`]s into one signed net amount per
//! participant: the receiver of a debt is credited, the payer is debited by the
//! same amount, so a fully aggregated balance always sums to zero.
//!
//! Participants keep the position in which they were first seen. The planner
//! breaks ties between equal balances by that position, so the balance is an
//! ordered list backed by a lookup index rather than a plain hash map.
//!
//! # Example
//!
//! ```
//! use debt_simplifier::{Balance, DebtRecord};
//!
//! let balance = Balance::aggregate([
//!     DebtRecord::new("Jacek", "Dominik", 10),
//!     DebtRecord::new("Dominik", "Jacek", 5),
//! ])
//! .unwrap();
//!
//! assert_eq!(balance.get("Jacek"), Some(5));
//! assert_eq!(balance.get("Dominik"), Some(-5));
//! assert_eq!(balance.total(), 0);
//! ```

use crate::base::{Amount, Participant};
use crate::error::ValidationError;
use crate::record::DebtRecord;
use std::collections::HashMap;
use tracing::debug;

/// Signed net position per participant, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balance {
    /// Participants and their running balance, in first-seen order.
    entries: Vec<(Participant, Amount)>,
    /// Position of each participant in `entries`.
    index: HashMap<Participant, usize>,
}

impl Balance {
    /// Creates an empty balance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates typed debt records into a balance.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] if any running balance leaves
    /// the `i64` range. No partial balance is returned.
    pub fn aggregate<I>(records: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = DebtRecord>,
    {
        let mut balance = Balance::new();
        for (row, record) in records.into_iter().enumerate() {
            balance.apply(row, &record)?;
        }

        debug!(participants = balance.len(), "aggregated debt records");
        Ok(balance)
    }

    /// Validates and aggregates raw `receiver, payer, amount` rows.
    ///
    /// The batch is all-or-nothing: the first malformed row aborts aggregation.
    ///
    /// # Errors
    ///
    /// Any [`ValidationError`], tagged with the zero-based index of the
    /// offending row.
    pub fn aggregate_rows<I, R, S>(rows: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut balance = Balance::new();
        for (row, fields) in rows.into_iter().enumerate() {
            let record = DebtRecord::from_fields(row, AsRef::<[S]>::as_ref(&fields))?;
            balance.apply(row, &record)?;
        }

        debug!(participants = balance.len(), "aggregated debt rows");
        Ok(balance)
    }

    /// Credits the receiver and debits the payer of one record.
    ///
    /// Both new values are computed before either is stored, so an overflow
    /// leaves the existing amounts untouched.
    fn apply(&mut self, row: usize, record: &DebtRecord) -> Result<(), ValidationError> {
        let receiver = self.slot(&record.receiver);
        let payer = self.slot(&record.payer);
        if receiver == payer {
            return Ok(());
        }

        let overflow = |slot: usize| ValidationError::AmountOverflow {
            row,
            participant: self.entries[slot].0.clone(),
        };
        let credited = self.entries[receiver]
            .1
            .checked_add(record.amount)
            .ok_or_else(|| overflow(receiver))?;
        let debited = self.entries[payer]
            .1
            .checked_sub(record.amount)
            .ok_or_else(|| overflow(payer))?;

        self.entries[receiver].1 = credited;
        self.entries[payer].1 = debited;
        Ok(())
    }

    /// Returns the position of `participant`, registering it at zero if unseen.
    fn slot(&mut self, participant: &Participant) -> usize {
        if let Some(&slot) = self.index.get(participant) {
            return slot;
        }
        let slot = self.entries.len();
        self.entries.push((participant.clone(), 0));
        self.index.insert(participant.clone(), slot);
        slot
    }

    /// Returns the net balance of a participant, if it has been seen.
    pub fn get(&self, participant: &str) -> Option<Amount> {
        self.index.get(participant).map(|&slot| self.entries[slot].1)
    }

    /// Iterates participants and balances in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Participant, Amount)> {
        self.entries.iter().map(|(participant, amount)| (participant, *amount))
    }

    /// Iterates participants in first-seen order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.entries.iter().map(|(participant, _)| participant)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances, widened so it cannot overflow.
    ///
    /// Zero for every balance built by aggregation.
    pub fn total(&self) -> i128 {
        self.entries.iter().map(|(_, amount)| i128::from(*amount)).sum()
    }
}

/// Builds a balance directly from `(participant, amount)` pairs.
///
/// A repeated participant keeps its first position and takes the last amount.
/// Nothing checks that the result sums to zero.
impl FromIterator<(Participant, Amount)> for Balance {
    fn from_iter<T: IntoIterator<Item = (Participant, Amount)>>(iter: T) -> Self {
        let mut balance = Balance::new();
        for (participant, amount) in iter {
            let slot = balance.slot(&participant);
            balance.entries[slot].1 = amount;
        }
        balance
    }
}
