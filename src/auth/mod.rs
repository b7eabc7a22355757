// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the book management API.
//!
//! ## Auth Flow
//!
//! 1. `POST /books/login` checks the email/password pair against the
//!    credential store and returns an HS512 access token
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The authorization gate:
//!    - Verifies signature, issuer, audience and expiry
//!    - Extracts:
//!      - `sub` → subject (email)
//!      - `authorities` → granted authorities, trusted as issued
//!    - Installs an [`AuthenticatedContext`] for the rest of the request
//! 4. The access policy allows or rejects the request based on its path and
//!    the installed context
//!
//! ## Security
//!
//! - One shared secret, loaded at startup and never mutated
//! - Tokens live 30 minutes and are never refreshed or revoked
//! - Expiry is checked with zero leeway

pub mod authority;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod password;
pub mod policy;
pub mod token;

pub use authority::{Authorities, Authority, ROLE_ADMIN, ROLE_USER};
pub use claims::{AuthenticatedContext, Principal, RequestDetails, TokenClaims};
pub use credentials::{authenticate, CredentialError, CredentialStore};
pub use error::{AuthError, TokenError};
pub use extractor::Auth;
pub use gate::{authorization_gate, AuthorizationGate, GateDecision, RequestDiagnostics};
pub use policy::{enforce_access_policy, AccessPolicy};
pub use token::{TokenIssuer, TokenVerifier};
