// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for books and user credentials in a single embedded
//! redb database file under `DATA_DIR`.
//!
//! ## Layout
//!
//! ```text
//! $DATA_DIR/
//!   books.redb
//!     books      # id → Book (JSON)
//!     users      # email → UserInfo (JSON)
//!     sequences  # name → last allocated id
//! ```
//!
//! Repositories borrow the [`Database`] and open one redb transaction per
//! operation; they hold no state of their own.

pub mod books;
pub mod database;
pub mod users;

pub use books::BookRepository;
pub use database::{Database, StorageError, StorageResult};
pub use users::{NewUser, UserInfo, UserRepository};
