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

//! Property-based tests for netting.
//!
//! These tests verify invariants that should hold for any batch of valid
//! debt records.

use debt_simplifier::{Amount, Balance, DebtRecord, SettlementRecord, plan, settle_debts};
use proptest::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Pick from a small pool of names so participants repeat across records.
fn arb_name() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|i| format!("P{i}"))
}

fn arb_record() -> impl Strategy<Value = DebtRecord> {
    (arb_name(), arb_name(), 0i64..=10_000)
        .prop_map(|(receiver, payer, amount)| DebtRecord::new(receiver, payer, amount))
}

fn arb_records() -> impl Strategy<Value = Vec<DebtRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

// =============================================================================
// Helpers
// =============================================================================

/// Applies settlements to a copy of the balance.
fn apply(balance: &Balance, settlements: &[SettlementRecord]) -> HashMap<String, Amount> {
    let mut remaining: HashMap<String, Amount> = balance
        .iter()
        .map(|(participant, amount)| (participant.to_string(), amount))
        .collect();

    for settlement in settlements {
        *remaining.get_mut(settlement.debtor.as_str()).unwrap() += settlement.amount;
        *remaining.get_mut(settlement.creditor.as_str()).unwrap() -= settlement.amount;
    }
    remaining
}

// =============================================================================
// Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Aggregated balances always sum to zero.
    #[test]
    fn balances_sum_to_zero(records in arb_records()) {
        let balance = Balance::aggregate(records).unwrap();
        prop_assert_eq!(balance.total(), 0);
    }

    /// Every participant in the input appears in the balance, in first-seen order.
    #[test]
    fn participants_in_first_seen_order(records in arb_records()) {
        let mut expected: Vec<String> = Vec::new();
        for record in &records {
            for name in [&record.receiver, &record.payer] {
                if !expected.iter().any(|seen| seen == name.as_str()) {
                    expected.push(name.to_string());
                }
            }
        }

        let balance = Balance::aggregate(records).unwrap();
        let actual: Vec<String> = balance.participants().map(ToString::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Applying the planned settlements zeroes every balance.
    #[test]
    fn settlements_zero_all_balances(records in arb_records()) {
        let balance = Balance::aggregate(records).unwrap();
        let settlements = plan(&balance).unwrap();

        let remaining = apply(&balance, &settlements);
        prop_assert!(remaining.values().all(|&amount| amount == 0), "left over: {:?}", remaining);
    }

    /// Debtors only pay, creditors only receive, settled participants do neither.
    #[test]
    fn settlements_conserve_balances(records in arb_records()) {
        let balance = Balance::aggregate(records).unwrap();
        let settlements = plan(&balance).unwrap();

        for (participant, amount) in balance.iter() {
            let paid: Amount = settlements
                .iter()
                .filter(|s| &s.debtor == participant)
                .map(|s| s.amount)
                .sum();
            let received: Amount = settlements
                .iter()
                .filter(|s| &s.creditor == participant)
                .map(|s| s.amount)
                .sum();

            if amount < 0 {
                prop_assert_eq!(paid, -amount);
                prop_assert_eq!(received, 0);
            } else if amount > 0 {
                prop_assert_eq!(paid, 0);
                prop_assert_eq!(received, amount);
            } else {
                prop_assert_eq!(paid + received, 0);
            }
        }
    }

    /// No settlement pays oneself, and every amount is positive.
    #[test]
    fn settlements_are_well_formed(records in arb_records()) {
        let balance = Balance::aggregate(records).unwrap();
        for settlement in plan(&balance).unwrap() {
            prop_assert_ne!(&settlement.debtor, &settlement.creditor);
            prop_assert!(settlement.amount > 0);
        }
    }

    /// At most one fewer settlement than participants with an open balance.
    #[test]
    fn settlement_count_is_bounded(records in arb_records()) {
        let balance = Balance::aggregate(records).unwrap();
        let open = balance.iter().filter(|&(_, amount)| amount != 0).count();
        let settlements = plan(&balance).unwrap();

        prop_assert!(settlements.len() <= open.saturating_sub(1));
    }

    /// Text rows and typed records net to the same settlements, every time.
    #[test]
    fn pipeline_is_deterministic(records in arb_records()) {
        let rows: Vec<[String; 3]> = records
            .iter()
            .map(|r| [r.receiver.to_string(), r.payer.to_string(), r.amount.to_string()])
            .collect();

        let first = settle_debts(&rows).unwrap();
        let second = settle_debts(&rows).unwrap();
        let typed = plan(&Balance::aggregate(records).unwrap()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &typed);
    }

    /// Any non-integer amount rejects the whole batch.
    #[test]
    fn bad_amount_rejects_batch(
        records in arb_records(),
        bad in "[a-z]{1,6}",
        position in any::<prop::sample::Index>(),
    ) {
        let mut rows: Vec<[String; 3]> = records
            .iter()
            .map(|r| [r.receiver.to_string(), r.payer.to_string(), r.amount.to_string()])
            .collect();
        let at = position.index(rows.len() + 1);
        rows.insert(at, ["X".to_string(), "Y".to_string(), bad]);

        prop_assert!(settle_debts(&rows).is_err());
    }
}
