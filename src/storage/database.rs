// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded catalogue database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `books`: book id → serialized Book
//! - `users`: email → serialized UserInfo
//! - `sequences`: sequence name → last allocated id

use std::path::Path;

use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: book id → serialized Book (JSON bytes).
pub(super) const BOOKS: TableDefinition<u32, &[u8]> = TableDefinition::new("books");

/// Credential table: email → serialized UserInfo (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Identity sequences: name → last allocated id.
const SEQUENCES: TableDefinition<&str, u32> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("sequence exhausted: {0}")]
    SequenceExhausted(&'static str),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID catalogue database.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BOOKS)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(super) fn begin_read(&self) -> StorageResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(super) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap liveness probe: opens and drops a read transaction.
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(BOOKS)?;
        Ok(())
    }
}

/// Allocate the next identifier of a named sequence inside `write_txn`.
///
/// The allocation commits or rolls back together with the caller's writes.
pub(super) fn next_id(write_txn: &WriteTransaction, sequence: &'static str) -> StorageResult<u32> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let current = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = current
        .checked_add(1)
        .ok_or(StorageError::SequenceExhausted(sequence))?;
    table.insert(sequence, next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.redb");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        db.ping().unwrap();
    }

    #[test]
    fn sequences_are_independent_and_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();

        let write_txn = db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "books").unwrap(), 1);
        assert_eq!(next_id(&write_txn, "books").unwrap(), 2);
        assert_eq!(next_id(&write_txn, "users").unwrap(), 1);
        write_txn.commit().unwrap();

        let write_txn = db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "books").unwrap(), 3);
    }

    #[test]
    fn aborted_allocation_is_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();

        let write_txn = db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "books").unwrap(), 1);
        write_txn.abort().unwrap();

        let write_txn = db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "books").unwrap(), 1);
    }
}
