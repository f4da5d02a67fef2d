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

//! File-backed persistence, one JSON document per account.
//!
//! Layout: `<root>/<account>.json`. Writes go to `<account>.json.tmp`, are
//! flushed, then renamed over the live file so readers never observe a
//! partially written record. The store does no locking of its own; callers
//! serialize writers per account (see [`crate::Ledger`]).

use crate::LedgerError;
use crate::account::AccountRecord;
use crate::base::AccountId;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens a store rooted at `root`, creating the directory (and any
    /// missing parents) if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: &AccountId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn temp_path(&self, id: &AccountId) -> PathBuf {
        self.root.join(format!("{id}.json.tmp"))
    }

    pub fn exists(&self, id: &AccountId, op: &'static str) -> Result<bool, LedgerError> {
        self.record_path(id)
            .try_exists()
            .map_err(LedgerError::storage(op))
    }

    /// Reads and decodes the record for `id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if there is no record file.
    /// - [`LedgerError::Storage`] for any other I/O failure.
    /// - [`LedgerError::Codec`] if the file is not a valid record.
    pub fn load(&self, id: &AccountId, op: &'static str) -> Result<AccountRecord, LedgerError> {
        let bytes = match fs::read(self.record_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(LedgerError::NotFound),
            Err(err) => return Err(LedgerError::storage(op)(err)),
        };
        serde_json::from_slice(&bytes).map_err(LedgerError::codec(op))
    }

    /// Replaces the record for `id` atomically.
    pub fn save(
        &self,
        id: &AccountId,
        record: &AccountRecord,
        op: &'static str,
    ) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(record).map_err(LedgerError::codec(op))?;
        let temp = self.temp_path(id);

        if let Err(err) = write_synced(&temp, &bytes) {
            let _ = fs::remove_file(&temp);
            return Err(LedgerError::storage(op)(err));
        }
        fs::rename(&temp, self.record_path(id)).map_err(|err| {
            let _ = fs::remove_file(&temp);
            LedgerError::storage(op)(err)
        })
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
