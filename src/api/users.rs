// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};
use validator::Validate;

use super::extract::AppJson;
use crate::{
    auth::{authenticate, password::hash_password, ROLE_USER},
    error::ApiError,
    models::{HttpResponse, UserLoginForm, UserRegistration},
    state::AppState,
    storage::{NewUser, StorageError, UserRepository},
};

const EMAIL_ALREADY_USED: &str = "Email already used. Please use new email and try again.";
const ACCOUNT_CREATION_FAILED: &str =
    "An error occurred while account creation. Please try again.";

/// Register a new user with the `ROLE_USER` authority.
#[utoipa::path(
    post,
    path = "/books/register",
    tag = "Users",
    request_body = UserRegistration,
    responses(
        (status = 200, description = "User created (envelope status 201)", body = HttpResponse),
        (status = 400, description = "Invalid form or email already used", body = HttpResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(form): AppJson<UserRegistration>,
) -> Result<Json<HttpResponse>, ApiError> {
    form.validate()?;

    let users = UserRepository::new(&state.db);
    if users.exists(&form.email)? {
        return Err(ApiError::bad_request(EMAIL_ALREADY_USED));
    }

    let password_hash = hash_password(&form.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::bad_request(ACCOUNT_CREATION_FAILED)
    })?;

    let user = match users.save(NewUser {
        email: form.email,
        password_hash,
        role: ROLE_USER.to_string(),
    }) {
        Ok(user) => user,
        Err(StorageError::AlreadyExists(_)) => return Err(ApiError::bad_request(EMAIL_ALREADY_USED)),
        Err(e) => {
            error!(error = %e, "Failed to store new user");
            return Err(ApiError::bad_request(ACCOUNT_CREATION_FAILED));
        }
    };
    info!(user_id = user.id, email = %user.email, "User registered");

    Ok(Json(
        HttpResponse::new(StatusCode::CREATED)
            .with_message(format!("User Created with name :{}", user.email)),
    ))
}

/// Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/books/login",
    tag = "Users",
    request_body = UserLoginForm,
    responses(
        (status = 200, description = "Login successful", body = HttpResponse),
        (status = 400, description = "Invalid form or bad credentials", body = HttpResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(form): AppJson<UserLoginForm>,
) -> Result<Json<HttpResponse>, ApiError> {
    form.validate()?;

    info!(email = %form.email, "Authenticating the user");
    let principal = authenticate(state.db.as_ref(), &form.email, &form.password)?;
    info!(email = %principal.subject, "User authenticated successfully");

    let token = state.issuer.issue(&principal)?;

    Ok(Json(
        HttpResponse::new(StatusCode::OK)
            .with_message("Login Successful")
            .with_messages(vec![
                format!("user name: {}", principal.subject),
                format!("access_token: {token}"),
            ]),
    ))
}
