// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AccessPolicy, AuthorizationGate, TokenIssuer, TokenVerifier};
use crate::config::ConfigError;
use crate::events::BookEventProducer;
use crate::storage::Database;

/// Shared application state.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub issuer: Arc<TokenIssuer>,
    pub gate: Arc<AuthorizationGate>,
    pub policy: Arc<AccessPolicy>,
    pub producer: BookEventProducer,
}

impl AppState {
    /// Bind the token issuer and gate to `secret`.
    ///
    /// Fails if the secret cannot be used for signing.
    pub fn new(
        db: Arc<Database>,
        secret: &str,
        producer: BookEventProducer,
    ) -> Result<Self, ConfigError> {
        let issuer = TokenIssuer::new(secret)?;
        let gate = AuthorizationGate::new(TokenVerifier::new(secret)?, db.clone());

        Ok(Self {
            db,
            issuer: Arc::new(issuer),
            gate: Arc::new(gate),
            policy: Arc::new(AccessPolicy::book_service()),
            producer,
        })
    }
}
