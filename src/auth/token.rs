// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token issuance and verification.
//!
//! Tokens are compact JWS strings signed with HS512 under a single shared
//! secret. They embed:
//!
//! - `iss` = [`ISSUER`], `aud` = [`AUDIENCE`]
//! - `sub` = principal email
//! - `authorities` = canonical authority claims
//! - `iat` / `exp`, with `exp = iat + ACCESS_TOKEN_TTL_MS`
//!
//! Nothing is stored server-side. A token is valid while its signature,
//! issuer and audience check out and `now < exp`. Expiry is evaluated with
//! zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::info;

use super::authority::Authorities;
use super::claims::{Principal, TokenClaims};
use super::error::TokenError;
use crate::config::ConfigError;

/// Issuer identifying the signing service.
pub const ISSUER: &str = "CODE_WITH_SRB_LLC";

/// Audience identifying the consuming service.
pub const AUDIENCE: &str = "BOOK_MANAGEMENT_SERVICE";

/// Token lifetime: 30 minutes.
pub const ACCESS_TOKEN_TTL_MS: i64 = 1_800_000;

const ALGORITHM: Algorithm = Algorithm::HS512;

fn validate_secret(secret: &str) -> Result<&[u8], ConfigError> {
    if secret.trim().is_empty() {
        return Err(ConfigError::BlankSecret);
    }
    Ok(secret.as_bytes())
}

/// Signs access tokens for authenticated principals.
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    /// Bind the issuer to the shared secret.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            key: EncodingKey::from_secret(validate_secret(secret)?),
        })
    }

    /// Issue a token for `principal`, valid from now.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now + Duration::milliseconds(ACCESS_TOKEN_TTL_MS);
        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat: now.timestamp(),
            sub: principal.subject.clone(),
            authorities: principal.authorities.to_claims(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        info!(
            subject = %principal.subject,
            expires_at = %expires_at.to_rfc3339(),
            "Issued access token"
        );
        Ok(token)
    }
}

/// Verifies access tokens signed by a [`TokenIssuer`] with the same secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Bind the verifier to the shared secret and the fixed issuer.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        let key = DecodingKey::from_secret(validate_secret(secret)?);

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked by `check_expiry` so that it can report the instant.
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self { key, validation })
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = self.decode_claims(token)?;
        check_expiry(&claims, now)?;
        Ok(claims)
    }

    /// Whether `token` has expired.
    ///
    /// Signature, issuer and audience failures are returned as errors, not
    /// folded into `true`.
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        self.is_expired_at(token, Utc::now())
    }

    pub fn is_expired_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
        let claims = self.decode_claims(token)?;
        Ok(check_expiry(&claims, now).is_err())
    }

    /// Subject of a fully verified token.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.extract_subject_at(token, Utc::now())
    }

    pub fn extract_subject_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        Ok(self.verify_at(token, now)?.sub)
    }

    /// True iff `subject` is non-empty and `token` has not expired.
    pub fn is_token_valid(&self, subject: &str, token: &str) -> Result<bool, TokenError> {
        self.is_token_valid_at(subject, token, Utc::now())
    }

    pub fn is_token_valid_at(
        &self,
        subject: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TokenError> {
        Ok(!subject.is_empty() && !self.is_expired_at(token, now)?)
    }

    /// Authorities embedded in a verified token.
    pub fn granted_authorities(&self, token: &str) -> Result<Authorities, TokenError> {
        self.granted_authorities_at(token, Utc::now())
    }

    pub fn granted_authorities_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Authorities, TokenError> {
        Ok(self.verify_at(token, now)?.granted_authorities())
    }

    /// Check signature, issuer, audience and required claims.
    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                ErrorKind::InvalidAudience => TokenError::InvalidAudience,
                ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
                    TokenError::InvalidIssuer
                }
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
                    TokenError::InvalidAudience
                }
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

fn check_expiry(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= now.timestamp() {
        let expired_at = claims.expires_at().unwrap_or(DateTime::UNIX_EPOCH);
        return Err(TokenError::Expired { expired_at });
    }
    Ok(())
}
