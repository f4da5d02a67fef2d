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

//! # Account Ledger
//!
//! This library provides a file-backed account ledger: accounts are created
//! with an opening balance, then receive deposits and withdrawals, each
//! appended to the account's history. Every account is one JSON file.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Account operations with per-account locking
//! - [`JsonFileStore`]: One JSON document per account, atomically replaced
//! - [`AccountRecord`]: Balance, password and append-only history
//! - [`CredentialVerifier`]: Password check used by every operation
//! - [`gateway`]: JSON-over-HTTP endpoints on top of the ledger
//!
//! ## Example
//!
//! ```
//! use account_ledger_rs::{AccountId, Flow, Ledger};
//!
//! let root = std::env::temp_dir().join("account-ledger-doctest");
//! # let _ = std::fs::remove_dir_all(&root);
//! let ledger = Ledger::open(&root).unwrap();
//! let id = AccountId::parse("A1").unwrap();
//!
//! ledger.create(&id, "pw", 100).unwrap();
//! ledger.deposit(&id, "pw", 50).unwrap();
//!
//! let record = ledger.history(&id, "pw").unwrap();
//! assert_eq!(record.balance, 150);
//! assert_eq!(record.history[1].kind, Flow::Deposit);
//! ```

pub mod account;
pub mod auth;
mod base;
pub mod config;
pub mod error;
pub mod gateway;
mod ledger;
mod storage;
pub mod telemetry;
mod transaction;

pub use account::AccountRecord;
pub use auth::{CredentialVerifier, PlaintextVerifier};
pub use base::{AccountId, Amount, MAX_ACCOUNT_LEN};
pub use config::Config;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use storage::JsonFileStore;
pub use transaction::{Flow, TIMESTAMP_FORMAT, Transaction};
