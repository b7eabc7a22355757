// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential lookup and login checks.

use tracing::{debug, warn};

use super::claims::Principal;
use super::password::{verify_password, PasswordError};
use crate::storage::{Database, StorageError, UserRepository};

/// Source of stored principals, keyed by email.
pub trait CredentialStore: Send + Sync {
    fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>, StorageError>;
}

impl CredentialStore for Database {
    fn find_principal_by_email(&self, email: &str) -> Result<Option<Principal>, StorageError> {
        Ok(UserRepository::new(self)
            .find_by_email(email)?
            .as_ref()
            .map(Principal::from))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown email or wrong password. The two are not distinguished.
    #[error("Bad credentials")]
    BadCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Check an email/password pair and return the matching principal.
pub fn authenticate(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Principal, CredentialError> {
    let Some(principal) = store.find_principal_by_email(email)? else {
        debug!(email = %email, "Login for unknown email");
        return Err(CredentialError::BadCredentials);
    };

    if !verify_password(password, principal.password_hash())? {
        warn!(email = %email, "Login with wrong password");
        return Err(CredentialError::BadCredentials);
    }

    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::storage::NewUser;

    fn store_with_user(email: &str, password: &str) -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        UserRepository::new(&db)
            .save(NewUser {
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                role: "ROLE_USER".to_string(),
            })
            .unwrap();
        (db, dir)
    }

    #[test]
    fn database_resolves_principals() {
        let (db, _dir) = store_with_user("a@b.com", "pw");

        let principal = db.find_principal_by_email("a@b.com").unwrap().unwrap();
        assert_eq!(principal.subject, "a@b.com");
        assert!(principal.authorities.contains("ROLE_USER"));
        assert!(db.find_principal_by_email("x@y.com").unwrap().is_none());
    }

    #[test]
    fn correct_password_authenticates() {
        let (db, _dir) = store_with_user("a@b.com", "pw");
        let principal = authenticate(&db, "a@b.com", "pw").unwrap();
        assert_eq!(principal.subject, "a@b.com");
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let (db, _dir) = store_with_user("a@b.com", "pw");
        assert!(matches!(
            authenticate(&db, "a@b.com", "nope"),
            Err(CredentialError::BadCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "x@y.com", "pw"),
            Err(CredentialError::BadCredentials)
        ));
    }
}
