// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book Management Service - Book catalogue API with JWT authorization
//!
//! This crate provides a small HTTP service for managing a catalogue of
//! books. Callers log in for a short-lived HS512 bearer token; every request
//! passes an authorization gate and a route-level access policy before it
//! reaches a handler. Created books are published on an event topic.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance, verification and the authorization gate
//! - `config` - Environment configuration
//! - `events` - Book event topic, producer and consumer
//! - `storage` - Embedded book and credential store (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod state;
pub mod storage;
