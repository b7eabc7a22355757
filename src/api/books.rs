// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book catalogue handlers.
//!
//! Successful operations answer with HTTP 200; the envelope's `statusCode`
//! carries the operation status (201 for a created book).

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use super::extract::{AppJson, AppPath};

use crate::{
    auth::Auth,
    error::{ApiError, GENERIC_FAILURE},
    models::{Book, BookDetails, HttpResponse},
    state::AppState,
    storage::{BookRepository, StorageError},
};

fn no_book_exists(id: u32) -> ApiError {
    ApiError::bad_request(format!("No book exists for the given id: {id}"))
}

fn book_response(status: StatusCode, message: String, books: Vec<Book>) -> Json<HttpResponse> {
    Json(HttpResponse::new(status).with_message(message).with_books(books))
}

/// List every book in the catalogue.
#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    responses(
        (status = 200, description = "All books", body = HttpResponse),
        (status = 401, description = "Missing or invalid token", body = HttpResponse),
        (status = 403, description = "No book role granted", body = HttpResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_books(State(state): State<AppState>) -> Result<Json<HttpResponse>, ApiError> {
    let books = BookRepository::new(&state.db).find_all()?;

    let message = if books.is_empty() {
        "No book found"
    } else {
        "Successfully retrieved all books"
    };
    Ok(book_response(StatusCode::OK, message.to_string(), books))
}

/// Retrieve a single book.
///
/// A missing book is not an error: the envelope carries a message and no data.
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = u32, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book, or a message when none exists", body = HttpResponse),
        (status = 401, description = "Missing or invalid token", body = HttpResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_book(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<HttpResponse>, ApiError> {
    let response = match BookRepository::new(&state.db).find_by_id(id)? {
        Some(book) => HttpResponse::new(StatusCode::OK)
            .with_message(format!("Successfully retrieved book with id: {id}"))
            .with_books(vec![book]),
        None => HttpResponse::new(StatusCode::OK)
            .with_message(format!("No book found for the id: {id}")),
    };
    Ok(Json(response))
}

/// Add a book and publish a creation event.
#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    request_body = BookDetails,
    responses(
        (status = 200, description = "Book created (envelope status 201)", body = HttpResponse),
        (status = 400, description = "Book could not be stored", body = HttpResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_book(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    AppJson(details): AppJson<BookDetails>,
) -> Result<Json<HttpResponse>, ApiError> {
    let book = BookRepository::new(&state.db).save(&details)?;
    info!(book_id = book.id, subject = %ctx.subject, "Book created");

    if let Err(e) = state.producer.send(&book).await {
        error!(book_id = book.id, error = %e, "Failed to publish book event");
        return Err(ApiError::bad_request(GENERIC_FAILURE));
    }

    Ok(book_response(
        StatusCode::CREATED,
        format!("Successfully created a new book with id: {}", book.id),
        vec![book],
    ))
}

/// Replace the fields of an existing book.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = u32, Path, description = "Book identifier")),
    request_body = BookDetails,
    responses(
        (status = 200, description = "Book updated", body = HttpResponse),
        (status = 400, description = "No book with this id", body = HttpResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_book(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
    AppJson(details): AppJson<BookDetails>,
) -> Result<Json<HttpResponse>, ApiError> {
    let book = match BookRepository::new(&state.db).update(id, &details) {
        Ok(book) => book,
        Err(StorageError::NotFound(_)) => return Err(no_book_exists(id)),
        Err(e) => return Err(e.into()),
    };

    Ok(book_response(
        StatusCode::OK,
        format!("Successfully updated book with id: {id}"),
        vec![book],
    ))
}

/// Remove a book.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = u32, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book deleted", body = HttpResponse),
        (status = 400, description = "No book with this id", body = HttpResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> Result<Json<HttpResponse>, ApiError> {
    match BookRepository::new(&state.db).delete_by_id(id) {
        Ok(()) => {}
        Err(StorageError::NotFound(_)) => return Err(no_book_exists(id)),
        Err(e) => return Err(e.into()),
    }

    Ok(book_response(
        StatusCode::OK,
        format!("Successfully deleted book with id: {id}"),
        Vec::new(),
    ))
}
