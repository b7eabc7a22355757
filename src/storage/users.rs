// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User credential repository.
//!
//! Users are keyed by email, which is the subject of every token issued for
//! them. The stored password is always an Argon2 PHC hash.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::database::{next_id, Database, StorageError, StorageResult, USERS};

const USER_SEQUENCE: &str = "users";

/// User record as persisted.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u32,
    pub email: String,
    /// Password hash (never the raw password).
    pub password: String,
    /// Comma-separated authority list, e.g. `ROLE_USER,ROLE_ADMIN`.
    pub role: String,
}

impl std::fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInfo")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Fields of a user that is about to be registered.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Look up a user by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<UserInfo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(email)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Check whether an email is already registered.
    pub fn exists(&self, email: &str) -> StorageResult<bool> {
        Ok(self.find_by_email(email)?.is_some())
    }

    /// Persist a new user. Fails if the email is already registered.
    pub fn save(&self, user: NewUser) -> StorageResult<UserInfo> {
        let write_txn = self.db.begin_write()?;
        let stored = {
            let mut table = write_txn.open_table(USERS)?;
            if table.get(user.email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("User {}", user.email)));
            }
            let id = next_id(&write_txn, USER_SEQUENCE)?;
            let stored = UserInfo {
                id,
                email: user.email,
                password: user.password_hash,
                role: user.role,
            };
            let json = serde_json::to_vec(&stored)?;
            table.insert(stored.email.as_str(), json.as_slice())?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }
}
