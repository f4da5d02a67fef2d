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

//! Property-based tests for the ledger.
//!
//! These tests verify invariants that should hold for any sequence of
//! deposits and withdrawals, including ones that fail.

use account_ledger_rs::{AccountId, AccountRecord, Flow, Ledger, LedgerError};
use proptest::prelude::*;
use std::ops::Deref;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Deposit(i64),
    Withdraw(i64),
}

fn arb_amount() -> impl Strategy<Value = i64> {
    1i64..=10_000
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_amount().prop_map(Op::Deposit),
        arb_amount().prop_map(Op::Withdraw),
    ]
}

/// Ledger over a fresh directory that is removed on drop.
struct ScratchLedger(Ledger);

impl ScratchLedger {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("ledger-prop-{}", uuid::Uuid::new_v4()));
        Self(Ledger::open(root).unwrap())
    }
}

impl Deref for ScratchLedger {
    type Target = Ledger;

    fn deref(&self) -> &Ledger {
        &self.0
    }
}

impl Drop for ScratchLedger {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.0.root());
    }
}

fn scratch_ledger() -> ScratchLedger {
    ScratchLedger::new()
}

// =============================================================================
// Record Invariant Tests (in memory)
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Balance equals replaying the history, and never goes negative.
    #[test]
    fn balance_matches_replayed_history(
        initial in 0i64..=10_000,
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let mut record = AccountRecord::open("pw", initial).unwrap();

        for op in ops {
            let _ = match op {
                Op::Deposit(amount) => record.deposit(amount),
                Op::Withdraw(amount) => record.withdraw(amount),
            };
            prop_assert!(record.balance >= 0);
            prop_assert_eq!(record.replayed_balance(), Some(record.balance));
        }
    }

    /// A failed withdrawal leaves the record exactly as it was.
    #[test]
    fn overdraft_leaves_record_unchanged(
        initial in 0i64..=10_000,
        excess in 1i64..=10_000,
    ) {
        let mut record = AccountRecord::open("pw", initial).unwrap();
        let before = record.clone();

        let result = record.withdraw(initial + excess);
        prop_assert!(matches!(result, Err(LedgerError::InsufficientBalance)));
        prop_assert_eq!(record, before);
    }
}

// =============================================================================
// Ledger Invariant Tests (on disk)
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Each history entry's balance equals the running total, and entries
    /// appear in invocation order.
    #[test]
    fn history_tracks_running_total(
        initial in 0i64..=5_000,
        ops in prop::collection::vec(arb_op(), 1..20),
    ) {
        let ledger = scratch_ledger();
        let id = AccountId::parse("prop").unwrap();
        ledger.create(&id, "pw", initial).unwrap();

        let mut expected = Vec::new();
        if initial > 0 {
            expected.push((Flow::Deposit, initial, initial));
        }
        let mut running = initial;

        for op in ops {
            match op {
                Op::Deposit(amount) => {
                    ledger.deposit(&id, "pw", amount).unwrap();
                    running += amount;
                    expected.push((Flow::Deposit, amount, running));
                }
                Op::Withdraw(amount) if amount <= running => {
                    ledger.withdraw(&id, "pw", amount).unwrap();
                    running -= amount;
                    expected.push((Flow::Withdraw, amount, running));
                }
                Op::Withdraw(amount) => {
                    let result = ledger.withdraw(&id, "pw", amount);
                    prop_assert!(matches!(result, Err(LedgerError::InsufficientBalance)));
                }
            }
        }

        let record = ledger.history(&id, "pw").unwrap();
        let actual: Vec<_> = record
            .history
            .iter()
            .map(|tx| (tx.kind, tx.amount, tx.balance_after))
            .collect();
        prop_assert_eq!(record.balance, running);
        prop_assert_eq!(actual, expected);
    }

    /// Any password other than the stored one is refused with no effect.
    #[test]
    fn wrong_password_has_no_effect(
        password in "[a-z]{1,12}",
        guess in "[a-z]{1,12}",
        amount in arb_amount(),
    ) {
        prop_assume!(password != guess);
        let ledger = scratch_ledger();
        let id = AccountId::parse("prop").unwrap();
        ledger.create(&id, &password, 10_000).unwrap();

        prop_assert!(matches!(
            ledger.deposit(&id, &guess, amount),
            Err(LedgerError::InvalidCredentials)
        ));
        prop_assert!(matches!(
            ledger.withdraw(&id, &guess, amount),
            Err(LedgerError::InvalidCredentials)
        ));

        let record = ledger.history(&id, &password).unwrap();
        prop_assert_eq!(record.balance, 10_000);
        prop_assert_eq!(record.history.len(), 1);
    }
}
