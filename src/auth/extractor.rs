// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated context.
//!
//! The gate middleware installs the context; handlers behind the access
//! policy read it with `Auth`:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx.subject is the caller's email
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedContext};

/// Extractor for authenticated requests.
pub struct Auth(pub AuthenticatedContext);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{claims::RequestDetails, Authorities};
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/books").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_requires_installed_context() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_reads_context_from_extensions() {
        let mut parts = parts();
        parts.extensions.insert(AuthenticatedContext {
            subject: "a@b.com".to_string(),
            authorities: Authorities::from_role_string("ROLE_USER"),
            principal: None,
            details: RequestDetails::default(),
        });

        let Auth(ctx) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.subject, "a@b.com");
    }
}
