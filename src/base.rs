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

//! Core identifier and amount types.

use crate::LedgerError;
use serde::Serialize;
use std::fmt;

/// Whole currency units. Balances are exact integers; there is no
/// fractional or floating-point representation anywhere in the ledger.
pub type Amount = i64;

/// Longest identifier whose temporary record file (`<id>.json.tmp`) still
/// fits the common 255-byte file name limit.
pub const MAX_ACCOUNT_LEN: usize = 255 - ".json.tmp".len();

/// Unique identifier for an account.
///
/// Doubles as the storage key: the record for `A1` lives in `A1.json`
/// under the storage root. Construct through [`AccountId::parse`], which
/// rejects identifiers that could not be used as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Validates a raw identifier.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmptyAccount`] if `raw` is empty.
    /// - [`LedgerError::InvalidAccount`] if `raw` contains a path separator
    ///   or a NUL byte, or is longer than [`MAX_ACCOUNT_LEN`] bytes.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        if raw.is_empty() {
            return Err(LedgerError::EmptyAccount);
        }
        if raw.len() > MAX_ACCOUNT_LEN || raw.contains(['/', '\\', '\0']) {
            return Err(LedgerError::InvalidAccount);
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
