// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Response Envelope
//!
//! Every response body, success or failure, is an [`HttpResponse`]. The
//! envelope carries its own `statusCode`/`httpStatus`, which for successful
//! operations may differ from the transport status (a created book is
//! answered with HTTP 200 and an envelope status of 201).
//!
//! ## Model Categories
//!
//! - **Books**: Catalogue entries and their request payloads
//! - **Users**: Registration and login forms

use std::borrow::Cow;

use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

// =============================================================================
// Response Envelope
// =============================================================================

/// Payload carried by the `data` field of an [`HttpResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(untagged)]
pub enum ResponseData {
    /// Book records.
    Books(Vec<Book>),
    /// Plain text lines (login details).
    Messages(Vec<String>),
}

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// When the response was produced (RFC 3339).
    pub time_stamp: String,
    /// Numeric status of the operation.
    pub status_code: u16,
    /// Status name in upper snake case, e.g. `BAD_REQUEST`.
    pub http_status: String,
    /// Human readable outcome of a successful operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Why an operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Operation payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl HttpResponse {
    /// Start an envelope for the given status, stamped with the current time.
    pub fn new(status: StatusCode) -> Self {
        Self {
            time_stamp: Utc::now().to_rfc3339(),
            status_code: status.as_u16(),
            http_status: status_name(status),
            message: None,
            reason: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_books(mut self, books: Vec<Book>) -> Self {
        self.data = Some(ResponseData::Books(books));
        self
    }

    pub fn with_messages(mut self, lines: Vec<String>) -> Self {
        self.data = Some(ResponseData::Messages(lines));
        self
    }
}

/// Upper snake case name of a status code (`404` → `NOT_FOUND`).
pub fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace([' ', '-'], "_")
}

// =============================================================================
// Book Models
// =============================================================================

/// A catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier assigned by the store on creation.
    pub id: u32,
    pub title: String,
    pub author: String,
    pub book_language: String,
    pub price: f64,
}

/// Book fields supplied by clients on create and update.
///
/// An `id` in the payload is ignored; the store assigns identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub book_language: String,
    pub price: f64,
}

impl BookDetails {
    /// Attach an identifier, producing a full record.
    pub fn into_book(self, id: u32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            book_language: self.book_language,
            price: self.price,
        }
    }
}

// =============================================================================
// User Models
// =============================================================================

pub const EMAIL_REQUIRED: &str = "Email cannot be null or empty";
pub const EMAIL_INVALID: &str = "Invalid email. Please enter a valid email address";
pub const PASSWORD_REQUIRED: &str = "Password cannot be null or empty";

/// Format check for a non-empty email. Blank input is left to the
/// `length` rule so it reports a single message.
fn email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    Err(ValidationError::new("email").with_message(Cow::Borrowed(EMAIL_INVALID)))
}

/// Request to register a new user.
///
/// Any role supplied by the client is ignored; new users always receive
/// `ROLE_USER`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UserRegistration {
    #[validate(
        length(min = 1, message = "Email cannot be null or empty"),
        custom(function = "email_format")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be null or empty"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UserLoginForm {
    #[validate(
        length(min = 1, message = "Email cannot be null or empty"),
        custom(function = "email_format")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be null or empty"))]
    pub password: String,
}
