// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book repository for the embedded database.
//!
//! Each book is stored as a JSON value keyed by its numeric id. Ids come
//! from the `books` sequence and are never reused.

use redb::ReadableTable;

use super::database::{next_id, Database, StorageError, StorageResult, BOOKS};
use crate::models::{Book, BookDetails};

const BOOK_SEQUENCE: &str = "books";

/// Repository for book operations.
pub struct BookRepository<'a> {
    db: &'a Database,
}

impl<'a> BookRepository<'a> {
    /// Create a new BookRepository.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List every book in ascending id order.
    pub fn find_all(&self) -> StorageResult<Vec<Book>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        let mut books = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            books.push(serde_json::from_slice(value.value())?);
        }
        Ok(books)
    }

    /// Get a book by id.
    pub fn find_by_id(&self, id: u32) -> StorageResult<Option<Book>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Persist a new book, assigning the next id.
    pub fn save(&self, details: &BookDetails) -> StorageResult<Book> {
        let write_txn = self.db.begin_write()?;
        let book = {
            let id = next_id(&write_txn, BOOK_SEQUENCE)?;
            let book = details.clone().into_book(id);
            let json = serde_json::to_vec(&book)?;
            let mut table = write_txn.open_table(BOOKS)?;
            table.insert(id, json.as_slice())?;
            book
        };
        write_txn.commit()?;
        Ok(book)
    }

    /// Replace the fields of an existing book.
    pub fn update(&self, id: u32, details: &BookDetails) -> StorageResult<Book> {
        let write_txn = self.db.begin_write()?;
        let book = {
            let mut table = write_txn.open_table(BOOKS)?;
            if table.get(id)?.is_none() {
                return Err(StorageError::NotFound(format!("Book {id}")));
            }
            let book = details.clone().into_book(id);
            let json = serde_json::to_vec(&book)?;
            table.insert(id, json.as_slice())?;
            book
        };
        write_txn.commit()?;
        Ok(book)
    }

    /// Delete a book by id.
    pub fn delete_by_id(&self, id: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(BOOKS)?;
            if table.remove(id)?.is_none() {
                return Err(StorageError::NotFound(format!("Book {id}")));
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
