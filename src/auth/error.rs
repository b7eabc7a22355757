// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token and authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::HttpResponse;

/// Request attribute recording why a token expired.
pub const EXPIRED_MESSAGE_ATTRIBUTE: &str = "expiredMessage";

/// Request attribute recording which claim failed validation.
pub const INVALID_CLAIM_ATTRIBUTE: &str = "invalidClaim";

/// Generic reason for tokens that cannot be trusted at all.
pub const TOKEN_NOT_VERIFIED: &str = "Token can not be verified";

/// Errors raised while issuing or verifying access tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("The Token's Signature resulted invalid when verified using the Algorithm: HmacSHA512")]
    InvalidSignature,

    #[error("The Claim 'iss' value doesn't match the required issuer.")]
    InvalidIssuer,

    #[error("The Claim 'aud' value doesn't contain the required audience.")]
    InvalidAudience,

    #[error("The Token has expired on {}.", .expired_at.to_rfc3339_opts(SecondsFormat::Secs, true))]
    Expired { expired_at: DateTime<Utc> },

    #[error("The Token is malformed: {0}")]
    Malformed(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Request attribute name and value to record for this error, if any.
    pub fn diagnostic_attribute(&self) -> Option<(&'static str, String)> {
        match self {
            TokenError::Expired { .. } => Some((EXPIRED_MESSAGE_ATTRIBUTE, self.to_string())),
            TokenError::InvalidIssuer | TokenError::InvalidAudience => {
                Some((INVALID_CLAIM_ATTRIBUTE, self.to_string()))
            }
            TokenError::Malformed(_) => Some((INVALID_CLAIM_ATTRIBUTE, self.to_string())),
            TokenError::InvalidSignature | TokenError::Signing(_) => None,
        }
    }
}

/// Rejections produced by the authorization gate and the access policy.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token verification failed at the gate boundary.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The credential store could not be queried.
    #[error("credential lookup failed: {0}")]
    CredentialLookup(String),

    /// No authenticated context for a route that needs one.
    #[error("Full authentication is required to access this resource")]
    Unauthenticated,

    /// Authenticated, but none of the required authorities is granted.
    #[error("Access Denied")]
    AccessDenied,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Token(TokenError::InvalidIssuer | TokenError::InvalidAudience) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Token(_) | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::CredentialLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reason shown to the caller.
    pub fn reason(&self) -> String {
        match self {
            AuthError::Token(
                e @ (TokenError::Expired { .. }
                | TokenError::InvalidIssuer
                | TokenError::InvalidAudience),
            ) => e.to_string(),
            AuthError::Token(_) => TOKEN_NOT_VERIFIED.to_string(),
            AuthError::CredentialLookup(_) => "An error occurred. Please try again".to_string(),
            AuthError::Unauthenticated | AuthError::AccessDenied => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = HttpResponse::new(status).with_reason(self.reason());
        (status, Json(body)).into_response()
    }
}
