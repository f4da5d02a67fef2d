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

//! Error types for ledger operations.

use std::io;
use thiserror::Error;

/// Ledger operation errors.
///
/// Storage and codec failures carry the name of the operation that hit
/// them (`create`, `history`, `deposit`, `withdraw`).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Account identifier is empty
    #[error("account is empty")]
    EmptyAccount,

    /// Password is empty
    #[error("password is empty")]
    EmptyPassword,

    /// Account identifier cannot be used as a record file name
    #[error("account is not a valid identifier")]
    InvalidAccount,

    /// Amount is zero or negative where a positive amount is required
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    #[error("account already exists")]
    AlreadyExists,

    #[error("account not found")]
    NotFound,

    /// Supplied password does not match the stored one
    #[error("invalid password")]
    InvalidCredentials,

    /// Withdrawal would drive the balance negative
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Balance arithmetic left the representable range
    #[error("balance overflow")]
    Overflow,

    #[error("[{op}] storage failure: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("[{op}] malformed account record: {source}")]
    Codec {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LedgerError {
    pub(crate) fn storage(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Storage { op, source }
    }

    pub(crate) fn codec(op: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Codec { op, source }
    }
}
