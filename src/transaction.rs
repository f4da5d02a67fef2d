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

//! Transaction records.
//!
//! A [`Transaction`] is one line of an account's history. It is immutable
//! once appended and carries a snapshot of the balance right after it was
//! applied, so a history can be audited without replaying it.

use crate::base::Amount;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in stored histories, local clock, second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direction of a transaction. Serialized as `"Deposit"` / `"Withdraw"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Flow {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    #[serde(rename = "time")]
    pub timestamp: String,
    #[serde(rename = "flow")]
    pub kind: Flow,
    /// Always positive; the sign is implied by `kind`.
    pub amount: Amount,
    #[serde(rename = "balance")]
    pub balance_after: Amount,
}

impl Transaction {
    /// Creates a transaction stamped with the current local time.
    pub fn now(kind: Flow, amount: Amount, balance_after: Amount) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            kind,
            amount,
            balance_after,
        }
    }
}
