// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route-level access policy.
//!
//! Runs after the authorization gate and decides, from the request path and
//! the installed [`AuthenticatedContext`], whether the request may proceed.
//! Rules are evaluated in order; the first matching rule wins.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::authority::{Authority, ROLE_ADMIN, ROLE_USER};
use super::claims::AuthenticatedContext;
use super::error::AuthError;

/// Path pattern of an access rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Exact path.
    Exact(String),
    /// `/prefix/**`: the prefix itself and everything below it.
    Prefix(String),
    /// Every path.
    Any,
}

impl RoutePattern {
    /// Parse `"/books"`, `"/books/**"` or `"/**"`.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some("") => RoutePattern::Any,
            Some(prefix) => RoutePattern::Prefix(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => path == exact,
            RoutePattern::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            RoutePattern::Any => true,
        }
    }
}

/// What a matching request must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    AnyAuthority(Vec<Authority>),
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub pattern: RoutePattern,
    pub requirement: Requirement,
}

/// Ordered list of access rules.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AccessRule {
            pattern: RoutePattern::parse(pattern),
            requirement,
        });
        self
    }

    pub fn permit_all(self, patterns: &[&str]) -> Self {
        patterns
            .iter()
            .fold(self, |policy, pattern| policy.rule(pattern, Requirement::PermitAll))
    }

    pub fn has_any_authority(self, pattern: &str, authorities: &[&str]) -> Self {
        let required = authorities.iter().filter_map(|a| Authority::parse(a)).collect();
        self.rule(pattern, Requirement::AnyAuthority(required))
    }

    /// Rules of the book management service.
    pub fn book_service() -> Self {
        Self::new()
            .permit_all(&[
                "/books/register",
                "/books/login",
                "/health/**",
                "/docs/**",
                "/api-doc/**",
            ])
            .has_any_authority("/books/**", &[ROLE_ADMIN, ROLE_USER])
            .rule("/**", Requirement::Authenticated)
    }

    /// Decide whether a request for `path` may proceed.
    ///
    /// Paths matching no rule require authentication.
    pub fn check(&self, path: &str, ctx: Option<&AuthenticatedContext>) -> Result<(), AuthError> {
        let requirement = self
            .rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&Requirement::Authenticated);

        match (requirement, ctx) {
            (Requirement::PermitAll, _) => Ok(()),
            (_, None) => Err(AuthError::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::AnyAuthority(required), Some(ctx)) => {
                if ctx.has_any_authority(required) {
                    Ok(())
                } else {
                    Err(AuthError::AccessDenied)
                }
            }
        }
    }
}

/// Access policy middleware. Must run inside the authorization gate.
pub async fn enforce_access_policy(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = request.extensions().get::<AuthenticatedContext>();
    match policy.check(request.uri().path(), ctx) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            debug!(
                path = %request.uri().path(),
                subject = ctx.map(|c| c.subject.as_str()).unwrap_or("-"),
                error = %e,
                "Access policy rejected request"
            );
            e.into_response()
        }
    }
}
