// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Granted authorities.
//!
//! ## Canonical Form
//!
//! A principal's stored role string (`"ROLE_USER,ROLE_ADMIN"`) and the
//! `authorities` claim of a token are both turned into an [`Authorities`] set
//! through [`Authority::parse`]: each segment is trimmed and empty segments
//! are dropped. Tokens carry authorities that were already canonical when
//! issued, so both paths yield exactly the same set for the same principal.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Authority granted to every newly registered user.
pub const ROLE_USER: &str = "ROLE_USER";

/// Administrative authority.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// A single granted authority, e.g. `ROLE_USER`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    /// Canonicalize a raw authority. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of granted authorities in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authorities(BTreeSet<Authority>);

impl Authorities {
    /// Resolve the authorities of a stored, comma-separated role string.
    pub fn from_role_string(role: &str) -> Self {
        role.split(',').filter_map(Authority::parse).collect()
    }

    /// Rebuild authorities from a token's `authorities` claim.
    pub fn from_claims<I, S>(claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        claims
            .into_iter()
            .filter_map(|claim| Authority::parse(claim.as_ref()))
            .collect()
    }

    /// Claim values to embed in a token, in canonical order.
    pub fn to_claims(&self) -> Vec<String> {
        self.0.iter().map(|a| a.0.clone()).collect()
    }

    pub fn contains(&self, authority: &str) -> bool {
        self.0.iter().any(|a| a.as_str() == authority)
    }

    /// True if at least one of `required` is granted.
    pub fn contains_any(&self, required: &[Authority]) -> bool {
        required.iter().any(|r| self.0.contains(r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Authority> for Authorities {
    fn from_iter<T: IntoIterator<Item = Authority>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Authorities {
    /// Renders the role-string form (`ROLE_ADMIN,ROLE_USER`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_claims().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_is_split_on_commas() {
        let authorities = Authorities::from_role_string("ROLE_USER,ROLE_ADMIN");
        assert_eq!(authorities.len(), 2);
        assert!(authorities.contains(ROLE_USER));
        assert!(authorities.contains(ROLE_ADMIN));
    }

    #[test]
    fn whitespace_and_empty_segments_are_dropped() {
        let authorities = Authorities::from_role_string(" ROLE_USER , ,ROLE_ADMIN,");
        assert_eq!(
            authorities.to_claims(),
            vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()]
        );
        assert!(Authorities::from_role_string("").is_empty());
    }

    #[test]
    fn role_string_and_claims_paths_agree() {
        let from_role = Authorities::from_role_string("ROLE_USER, ROLE_ADMIN");
        let from_claims = Authorities::from_claims(from_role.to_claims());
        assert_eq!(from_role, from_claims);
    }

    #[test]
    fn duplicates_collapse() {
        let authorities = Authorities::from_claims(["ROLE_USER", "ROLE_USER"]);
        assert_eq!(authorities.len(), 1);
    }

    #[test]
    fn contains_any_checks_required_set() {
        let authorities = Authorities::from_role_string(ROLE_USER);
        let admin_only = [Authority::parse(ROLE_ADMIN).unwrap()];
        let any_role = [
            Authority::parse(ROLE_ADMIN).unwrap(),
            Authority::parse(ROLE_USER).unwrap(),
        ];
        assert!(!authorities.contains_any(&admin_only));
        assert!(authorities.contains_any(&any_role));
    }

    #[test]
    fn display_renders_role_string() {
        let authorities = Authorities::from_role_string("ROLE_USER,ROLE_ADMIN");
        assert_eq!(authorities.to_string(), "ROLE_ADMIN,ROLE_USER");
    }
}
