// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book event key and value, serialized as JSON.

use serde::{Deserialize, Serialize};

use crate::models::Book;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookKey {
    pub book_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookValue {
    pub title: String,
    pub author: String,
    pub book_language: String,
    pub price: f64,
}

impl From<&Book> for BookKey {
    fn from(book: &Book) -> Self {
        Self { book_id: book.id }
    }
}

impl From<&Book> for BookValue {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            book_language: book.book_language.clone(),
            price: book.price,
        }
    }
}
