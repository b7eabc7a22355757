// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims, principals and the per-request authenticated context.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::authority::{Authorities, Authority};
use crate::storage::UserInfo;

/// Claims carried by an access token.
///
/// `iat` and `exp` are seconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub sub: String,
    #[serde(default)]
    pub authorities: Vec<String>,
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Authorities granted by this token, trusted as issued.
    pub fn granted_authorities(&self) -> Authorities {
        Authorities::from_claims(&self.authorities)
    }
}

/// Identity record governing authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Email address, unique per principal.
    pub subject: String,
    pub authorities: Authorities,
    password_hash: String,
}

impl Principal {
    pub fn new(
        subject: impl Into<String>,
        authorities: Authorities,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            authorities,
            password_hash: password_hash.into(),
        }
    }

    /// Stored password hash. Only read when checking a login.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .field("authorities", &self.authorities)
            .finish_non_exhaustive()
    }
}

impl From<&UserInfo> for Principal {
    fn from(user: &UserInfo) -> Self {
        Self::new(
            user.email.clone(),
            Authorities::from_role_string(&user.role),
            user.password.clone(),
        )
    }
}

/// Request metadata attached to an authenticated context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDetails {
    /// Peer address, when the server was started with connect info.
    pub remote_addr: Option<SocketAddr>,
    /// Value of the `x-request-id` header.
    pub request_id: Option<String>,
}

impl RequestDetails {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            remote_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            request_id: request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Authenticated principal installed for the remainder of a request.
///
/// Authorities come from the token claims and are never re-read from the
/// credential store.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    pub subject: String,
    pub authorities: Authorities,
    /// Stored principal for the subject, if one exists.
    pub principal: Option<Principal>,
    pub details: RequestDetails,
}

impl AuthenticatedContext {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    pub fn has_any_authority(&self, required: &[Authority]) -> bool {
        self.authorities.contains_any(required)
    }
}
