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

//! Account operations.
//!
//! The [`Ledger`] is the central component: it owns the [`JsonFileStore`],
//! checks credentials, and applies deposits and withdrawals.
//!
//! # Operations
//!
//! - **Create**: writes a new record, failing if the account exists.
//! - **History**: reads the full record after checking the password.
//! - **Deposit / Withdraw**: read the record, mutate it, rewrite it.
//!
//! # Thread Safety
//!
//! Every mutation holds an exclusive per-account lock for its whole
//! read-modify-write, so concurrent deposits to one account are never lost.
//! Different accounts never contend. Reads take no lock; the store's atomic
//! replace guarantees they see a complete record. A lock entry lives only
//! while some caller holds or waits on it, so the table stays bounded by the
//! number of in-flight writes.

use crate::LedgerError;
use crate::account::AccountRecord;
use crate::auth::{CredentialVerifier, PlaintextVerifier};
use crate::base::{AccountId, Amount};
use crate::storage::JsonFileStore;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File-backed account ledger.
///
/// # Invariants
///
/// - An account identifier is created at most once.
/// - `balance` equals the sum of deposits minus withdrawals in `history`.
/// - A withdrawal never drives `balance` negative.
/// - A failed operation leaves the stored record unchanged.
pub struct Ledger {
    store: JsonFileStore,
    verifier: Arc<dyn CredentialVerifier>,
    /// Writer locks indexed by account.
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl Ledger {
    /// Opens a ledger rooted at `root` with plaintext password checks,
    /// creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_verifier(root, Arc::new(PlaintextVerifier))
    }

    pub fn with_verifier(
        root: impl Into<PathBuf>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> io::Result<Self> {
        Ok(Self {
            store: JsonFileStore::open(root)?,
            verifier,
            locks: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// Creates an account with an opening balance of `initial`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyExists`] - A record for `id` is present.
    /// - [`LedgerError::InvalidAmount`] - `initial` is negative.
    pub fn create(&self, id: &AccountId, password: &str, initial: Amount) -> Result<(), LedgerError> {
        const OP: &str = "create";
        self.exclusive(id, || {
            if self.store.exists(id, OP)? {
                return Err(LedgerError::AlreadyExists);
            }
            let record = AccountRecord::open(password, initial)?;
            self.store.save(id, &record, OP)?;

            tracing::debug!(account = %id, balance = record.balance, "account created");
            Ok(())
        })
    }

    /// Returns the full record for `id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - No record for `id`.
    /// - [`LedgerError::InvalidCredentials`] - `password` does not match.
    pub fn history(&self, id: &AccountId, password: &str) -> Result<AccountRecord, LedgerError> {
        self.authorized(id, password, "history")
    }

    /// Credits `amount` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Those of [`Ledger::history`], plus [`LedgerError::InvalidAmount`] for
    /// a non-positive amount and [`LedgerError::Overflow`].
    pub fn deposit(
        &self,
        id: &AccountId,
        password: &str,
        amount: Amount,
    ) -> Result<AccountRecord, LedgerError> {
        self.mutate(id, password, "deposit", |record| record.deposit(amount))
    }

    /// Debits `amount` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Those of [`Ledger::history`], plus [`LedgerError::InvalidAmount`] for
    /// a non-positive amount and [`LedgerError::InsufficientBalance`] when
    /// the balance is lower than `amount`.
    pub fn withdraw(
        &self,
        id: &AccountId,
        password: &str,
        amount: Amount,
    ) -> Result<AccountRecord, LedgerError> {
        self.mutate(id, password, "withdraw", |record| record.withdraw(amount))
    }

    fn authorized(
        &self,
        id: &AccountId,
        password: &str,
        op: &'static str,
    ) -> Result<AccountRecord, LedgerError> {
        let record = self.store.load(id, op)?;
        if !self.verifier.verify(&record.password, password) {
            return Err(LedgerError::InvalidCredentials);
        }
        Ok(record)
    }

    fn mutate<F>(
        &self,
        id: &AccountId,
        password: &str,
        op: &'static str,
        apply: F,
    ) -> Result<AccountRecord, LedgerError>
    where
        F: FnOnce(&mut AccountRecord) -> Result<(), LedgerError>,
    {
        self.exclusive(id, || {
            let mut record = self.authorized(id, password, op)?;
            apply(&mut record)?;
            self.store.save(id, &record, op)?;

            tracing::debug!(account = %id, op, balance = record.balance, "account updated");
            Ok(record)
        })
    }

    /// Runs `f` under the writer lock for `id`, then drops the lock entry
    /// unless another caller is holding or waiting on it.
    fn exclusive<T>(
        &self,
        id: &AccountId,
        f: impl FnOnce() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let lock = self.lock_for(id);
        let result = {
            let _guard = lock.lock();
            f()
        };
        // One reference in the map, one here. Any other handle belongs to a
        // caller that still needs this mutex.
        self.locks.remove_if(id, |_, held| Arc::strong_count(held) == 2);
        result
    }

    // The map guard is released before the mutex is taken, so a slow write
    // on one account never blocks lookups for accounts in the same shard.
    fn lock_for(&self, id: &AccountId) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(id.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyAll;

    impl CredentialVerifier for DenyAll {
        fn verify(&self, _stored: &str, _supplied: &str) -> bool {
            false
        }
    }

    /// Ledger over a fresh directory that is removed on drop.
    struct ScratchLedger(Ledger);

    impl ScratchLedger {
        fn new() -> Self {
            Self::with_verifier(Arc::new(PlaintextVerifier))
        }

        fn with_verifier(verifier: Arc<dyn CredentialVerifier>) -> Self {
            let root = std::env::temp_dir().join(format!("ledger-{}", uuid::Uuid::new_v4()));
            Self(Ledger::with_verifier(root, verifier).unwrap())
        }
    }

    impl std::ops::Deref for ScratchLedger {
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

    #[test]
    fn lock_handles_are_shared_per_account() {
        let ledger = ScratchLedger::new();
        let a = AccountId::parse("A").unwrap();
        let b = AccountId::parse("B").unwrap();

        assert!(Arc::ptr_eq(&ledger.lock_for(&a), &ledger.lock_for(&a)));
        assert!(!Arc::ptr_eq(&ledger.lock_for(&a), &ledger.lock_for(&b)));
    }

    #[test]
    fn custom_verifier_is_consulted() {
        let ledger = ScratchLedger::with_verifier(Arc::new(DenyAll));
        let id = AccountId::parse("A1").unwrap();
        ledger.create(&id, "pw", 10).unwrap();

        let result = ledger.history(&id, "pw");
        assert!(matches!(result, Err(LedgerError::InvalidCredentials)));
    }

    #[test]
    fn create_with_negative_amount_writes_nothing() {
        let ledger = ScratchLedger::new();
        let id = AccountId::parse("A1").unwrap();

        let result = ledger.create(&id, "pw", -10);
        assert!(matches!(result, Err(LedgerError::InvalidAmount)));
        assert!(matches!(ledger.history(&id, "pw"), Err(LedgerError::NotFound)));
    }

    #[test]
    fn failed_operations_release_lock_entries() {
        let ledger = ScratchLedger::new();
        for i in 0..1_000 {
            let ghost = AccountId::parse(&format!("ghost{i}")).unwrap();
            assert!(matches!(ledger.deposit(&ghost, "pw", 1), Err(LedgerError::NotFound)));
            assert!(matches!(ledger.withdraw(&ghost, "pw", 1), Err(LedgerError::NotFound)));
        }
        assert_eq!(ledger.locks.len(), 0);
    }

    #[test]
    fn successful_operations_release_lock_entries() {
        let ledger = ScratchLedger::new();
        let id = AccountId::parse("A1").unwrap();
        ledger.create(&id, "pw", 10).unwrap();
        ledger.deposit(&id, "pw", 5).unwrap();
        ledger.withdraw(&id, "pw", 3).unwrap();
        assert!(matches!(ledger.create(&id, "pw", 1), Err(LedgerError::AlreadyExists)));

        assert_eq!(ledger.locks.len(), 0);
        assert_eq!(ledger.history(&id, "pw").unwrap().balance, 12);
    }

    #[test]
    fn waiting_writer_keeps_lock_entry_alive() {
        let ledger = ScratchLedger::new();
        let id = AccountId::parse("A1").unwrap();
        ledger.create(&id, "pw", 10).unwrap();

        // A second handle stands in for a writer queued on the same account.
        let queued = ledger.lock_for(&id);
        ledger.deposit(&id, "pw", 1).unwrap();
        assert!(Arc::ptr_eq(&queued, &ledger.lock_for(&id)));

        drop(queued);
        ledger.deposit(&id, "pw", 1).unwrap();
        assert_eq!(ledger.locks.len(), 0);
    }

    #[test]
    fn longest_account_identifier_round_trips() {
        let ledger = ScratchLedger::new();
        let id = AccountId::parse(&"a".repeat(crate::base::MAX_ACCOUNT_LEN)).unwrap();
        ledger.create(&id, "pw", 7).unwrap();
        ledger.deposit(&id, "pw", 3).unwrap();
        assert_eq!(ledger.history(&id, "pw").unwrap().balance, 10);
    }
}
