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

//! Settlement planning.
//!
//! [`plan`] turns a zero-sum [`Balance`] into an ordered list of payments that
//! brings every participant back to zero.
//!
//! # Algorithm
//!
//! Participants are ranked by ascending balance (ties keep first-seen order),
//! which puts every debtor before every creditor. Each debtor, lowest first,
//! then pays creditors starting from the top of the ranking until its debt is
//! cleared. Every payment clears at least one side, so `n` participants with a
//! nonzero balance need at most `n - 1` payments. The result is deterministic
//! but not guaranteed to be the global minimum.

use crate::balance::Balance;
use crate::base::{Amount, Participant};
use crate::error::SettleError;
use crate::record::SettlementRecord;
use tracing::{debug, trace};

/// Plans the payments that settle a balance.
///
/// # Errors
///
/// Returns [`SettleError::InvariantViolation`] if the balances do not sum to
/// zero. Nothing is planned in that case.
pub fn plan(balance: &Balance) -> Result<Vec<SettlementRecord>, SettleError> {
    let total = balance.total();
    if total != 0 {
        return Err(SettleError::InvariantViolation { total });
    }

    // Stable sort keeps first-seen order between equal balances.
    let mut ranked: Vec<(&Participant, Amount)> = balance.iter().collect();
    ranked.sort_by_key(|&(_, amount)| amount);
    let (people, mut totals): (Vec<&Participant>, Vec<Amount>) = ranked.into_iter().unzip();

    let mut settlements = Vec::new();
    for i in 0..totals.len() {
        if totals[i] >= 0 {
            continue;
        }

        for j in (i + 1..totals.len()).rev() {
            if totals[i] == 0 {
                break;
            }
            if totals[j] <= 0 {
                continue;
            }

            let amount = totals[i].saturating_neg().min(totals[j]);
            totals[i] += amount;
            totals[j] -= amount;

            trace!(debtor = %people[i], creditor = %people[j], amount, "settlement");
            settlements.push(SettlementRecord::new(people[i].clone(), people[j].clone(), amount));
        }
    }

    debug_assert!(
        totals.iter().all(|&amount| amount == 0),
        "Invariant violated: unsettled balances remain: {totals:?}"
    );

    debug!(
        participants = balance.len(),
        settlements = settlements.len(),
        "planned settlements"
    );
    Ok(settlements)
}

/// Aggregates raw `receiver, payer, amount` rows and plans their settlement.
///
/// # Example
///
/// ```
/// use debt_simplifier::{settle_debts, SettlementRecord};
///
/// let settlements = settle_debts([["A", "B", "10"]]).unwrap();
/// assert_eq!(settlements, [SettlementRecord::new("B", "A", 10)]);
/// ```
///
/// # Errors
///
/// Any [`ValidationError`](crate::ValidationError) from aggregation, wrapped in
/// [`SettleError::Validation`].
pub fn settle_debts<I, R, S>(rows: I) -> Result<Vec<SettlementRecord>, SettleError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let balance = Balance::aggregate_rows(rows)?;
    plan(&balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(entries: &[(&str, Amount)]) -> Balance {
        entries
            .iter()
            .map(|&(name, amount)| (Participant::from(name), amount))
            .collect()
    }

    #[test]
    fn empty_balance_plans_nothing() {
        assert!(plan(&Balance::new()).unwrap().is_empty());
    }

    #[test]
    fn all_zero_balance_plans_nothing() {
        let settled = balance(&[("A", 0), ("B", 0)]);
        assert!(plan(&settled).unwrap().is_empty());
    }

    #[test]
    fn largest_creditor_is_paid_first() {
        let open = balance(&[("Small", 2), ("Debtor", -7), ("Large", 5)]);
        assert_eq!(
            plan(&open).unwrap(),
            [
                SettlementRecord::new("Debtor", "Large", 5),
                SettlementRecord::new("Debtor", "Small", 2),
            ]
        );
    }

    #[test]
    fn equal_balances_keep_first_seen_order() {
        // Ranked: D1, D2 (both -3), then C (6). D1 is seen first and pays first.
        let open = balance(&[("C", 6), ("D1", -3), ("D2", -3)]);
        assert_eq!(
            plan(&open).unwrap(),
            [
                SettlementRecord::new("D1", "C", 3),
                SettlementRecord::new("D2", "C", 3),
            ]
        );
    }

    #[test]
    fn rejects_unbalanced_input() {
        let open = balance(&[("A", 10), ("B", -4)]);
        assert_eq!(
            plan(&open).unwrap_err(),
            SettleError::InvariantViolation { total: 6 }
        );
    }

    #[test]
    fn extreme_debtor_does_not_overflow() {
        let open = balance(&[("D", Amount::MIN), ("C1", Amount::MAX), ("C2", 1)]);
        assert_eq!(
            plan(&open).unwrap(),
            [
                SettlementRecord::new("D", "C1", Amount::MAX),
                SettlementRecord::new("D", "C2", 1),
            ]
        );
    }
}
