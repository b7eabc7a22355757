// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authorization gate.
//!
//! Every request starts **Unauthenticated**. The gate either leaves it there
//! or moves it to **Authenticated** by installing an [`AuthenticatedContext`]
//! in the request extensions. Nothing survives the request.
//!
//! ## Decision Procedure
//!
//! 1. Exempt requests pass straight through: no `Authorization` header, a
//!    header without the `Bearer ` prefix, a header whose value equals
//!    `OPTIONS` (ignoring case), or a public route.
//! 2. The subject is read from the fully verified token. A failure records a
//!    diagnostic attribute and becomes a boundary rejection.
//! 3. `is_token_valid(subject, token)` decides between Authenticated and
//!    Unauthenticated.
//! 4. Authorities come from the token claims, verbatim.
//!
//! The gate never rejects for lack of authentication. That is the job of
//! [`super::policy`], which runs after it.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::claims::{AuthenticatedContext, RequestDetails};
use super::credentials::CredentialStore;
use super::error::AuthError;
use super::token::TokenVerifier;

/// Prefix of a bearer `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Routes reachable without a token. Matched exactly.
pub const PUBLIC_ROUTES: [&str; 2] = ["/books/register", "/books/login"];

/// Header value that skips the gate entirely.
///
/// This compares the header value, not the HTTP method. Since such a value
/// never carries the bearer prefix the rule is unreachable in practice.
const OPTIONS_HEADER_VALUE: &str = "OPTIONS";

/// Diagnostic attributes recorded while evaluating a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDiagnostics(BTreeMap<&'static str, String>);

impl RequestDiagnostics {
    pub fn record(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Boundary rejection raised while authenticating a token.
#[derive(Debug)]
pub struct GateRejection {
    pub error: AuthError,
    pub diagnostics: RequestDiagnostics,
}

/// Outcome of the gate for a single request.
#[derive(Debug)]
pub enum GateDecision {
    /// Skipped the gate. The request stays Unauthenticated.
    Exempt,
    /// A valid token was presented.
    Authenticated(AuthenticatedContext),
    /// The token checked out but did not yield a usable subject.
    Unauthenticated,
    /// Token verification failed.
    Rejected(GateRejection),
}

impl GateDecision {
    /// The context to install, if the request ended Authenticated.
    pub fn context(&self) -> Option<&AuthenticatedContext> {
        match self {
            GateDecision::Authenticated(ctx) => Some(ctx),
            _ => None,
        }
    }
}

/// Authorization gate bound to the shared verifier and credential store.
pub struct AuthorizationGate {
    verifier: TokenVerifier,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthorizationGate {
    pub fn new(verifier: TokenVerifier, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            verifier,
            credentials,
        }
    }

    /// Whether `request` bypasses token processing.
    pub fn is_exempt<B>(request: &Request<B>) -> bool {
        if PUBLIC_ROUTES.contains(&request.uri().path()) {
            return true;
        }
        match bearer_header(request) {
            None => true,
            Some(value) => {
                !value.starts_with(BEARER_PREFIX) || value.eq_ignore_ascii_case(OPTIONS_HEADER_VALUE)
            }
        }
    }

    /// Run the decision procedure for `request`.
    pub fn evaluate<B>(&self, request: &Request<B>) -> GateDecision {
        self.evaluate_at(request, Utc::now())
    }

    /// Run the decision procedure as if the current time were `now`.
    pub fn evaluate_at<B>(&self, request: &Request<B>, now: DateTime<Utc>) -> GateDecision {
        if Self::is_exempt(request) {
            return GateDecision::Exempt;
        }
        let Some(token) = bearer_header(request).and_then(|v| v.strip_prefix(BEARER_PREFIX))
        else {
            return GateDecision::Exempt;
        };

        let mut diagnostics = RequestDiagnostics::default();
        match self.authorize(token, RequestDetails::from_request(request), now, &mut diagnostics) {
            Ok(Some(ctx)) => GateDecision::Authenticated(ctx),
            Ok(None) => GateDecision::Unauthenticated,
            Err(error) => GateDecision::Rejected(GateRejection { error, diagnostics }),
        }
    }

    fn authorize(
        &self,
        token: &str,
        details: RequestDetails,
        now: DateTime<Utc>,
        diagnostics: &mut RequestDiagnostics,
    ) -> Result<Option<AuthenticatedContext>, AuthError> {
        let subject = match self.verifier.extract_subject_at(token, now) {
            Ok(subject) => subject,
            Err(e) => {
                if let Some((name, value)) = e.diagnostic_attribute() {
                    diagnostics.record(name, value);
                }
                return Err(e.into());
            }
        };

        if !self.verifier.is_token_valid_at(&subject, token, now)? {
            return Ok(None);
        }

        let authorities = self.verifier.granted_authorities_at(token, now)?;
        let principal = self
            .credentials
            .find_principal_by_email(&subject)
            .map_err(|e| AuthError::CredentialLookup(e.to_string()))?;

        Ok(Some(AuthenticatedContext {
            subject,
            authorities,
            principal,
            details,
        }))
    }
}

fn bearer_header<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Gate middleware.
///
/// Any context supplied by an earlier layer is discarded before evaluation.
/// Rejections carry their [`RequestDiagnostics`] in the response extensions.
pub async fn authorization_gate(
    State(gate): State<Arc<AuthorizationGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().remove::<AuthenticatedContext>();

    match gate.evaluate(&request) {
        GateDecision::Exempt | GateDecision::Unauthenticated => next.run(request).await,
        GateDecision::Authenticated(ctx) => {
            debug!(subject = %ctx.subject, authorities = %ctx.authorities, "Request authenticated");
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        GateDecision::Rejected(GateRejection { error, diagnostics }) => {
            error!(
                path = %request.uri().path(),
                error = %error,
                "Cannot set user authentication"
            );
            let mut response = error.into_response();
            response.extensions_mut().insert(diagnostics);
            response
        }
    }
}
