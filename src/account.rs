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

//! Account records.
//!
//! An [`AccountRecord`] is the unit of persistence: it is read whole,
//! mutated in memory and written back whole.
//!
//! # Example
//!
//! ```
//! use account_ledger_rs::{AccountRecord, Flow};
//!
//! let mut record = AccountRecord::open("secret", 100).unwrap();
//! record.deposit(50).unwrap();
//! assert_eq!(record.balance, 150);
//! assert_eq!(record.history.last().unwrap().kind, Flow::Deposit);
//! ```

use crate::LedgerError;
use crate::base::Amount;
use crate::transaction::{Flow, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub password: String,
    pub balance: Amount,
    /// Append-only, oldest first.
    #[serde(default)]
    pub history: Vec<Transaction>,
}

impl AccountRecord {
    /// Creates a record with an opening balance.
    ///
    /// A positive opening balance is recorded as the first `Deposit`; a zero
    /// opening balance leaves the history empty.
    pub fn open(password: impl Into<String>, initial: Amount) -> Result<Self, LedgerError> {
        if initial < 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let mut history = Vec::new();
        if initial > 0 {
            history.push(Transaction::now(Flow::Deposit, initial, initial));
        }
        Ok(Self {
            password: password.into(),
            balance: initial,
            history,
        })
    }

    /// Increases the balance and records a `Deposit`.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.append(Flow::Deposit, amount, balance);
        Ok(())
    }

    /// Decreases the balance and records a `Withdraw`.
    pub fn withdraw(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.append(Flow::Withdraw, amount, balance);
        Ok(())
    }

    /// Balance obtained by replaying the history from zero.
    ///
    /// Equals `balance` for every record this crate writes.
    pub fn replayed_balance(&self) -> Option<Amount> {
        self.history.iter().try_fold(0 as Amount, |acc, tx| match tx.kind {
            Flow::Deposit => acc.checked_add(tx.amount),
            Flow::Withdraw => acc.checked_sub(tx.amount),
        })
    }

    fn append(&mut self, kind: Flow, amount: Amount, balance: Amount) {
        self.balance = balance;
        self.history.push(Transaction::now(kind, amount, balance));
        self.assert_invariants();
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= 0,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
        debug_assert_eq!(
            self.history.last().map(|tx| tx.balance_after),
            Some(self.balance),
            "Invariant violated: last history entry does not match balance"
        );
    }
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("password", &"<redacted>")
            .field("balance", &self.balance)
            .field("history", &self.history)
            .finish()
    }
}
