//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use bookshelf_http::error::AppError;
use serde_json::Value;

use super::models::{Book, BookSubmission};
use super::store::BookStore;

/// Health check endpoint
pub async fn health_check(State(store): State<Arc<BookStore>>) -> String {
    format!("books module is healthy ({} stored)", store.len())
}

/// List every book, newest first
pub async fn list_books(State(store): State<Arc<BookStore>>) -> Json<Vec<Book>> {
    Json(store.list())
}

/// Validate and store a new book
///
/// The body is read as raw bytes so a missing or wrong `Content-Type` does
/// not stop a well-formed JSON object from being accepted.
pub async fn create_book(
    State(store): State<Arc<BookStore>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let submission = parse_submission(&body)?;

    match store.create(&submission) {
        Ok(book) => {
            tracing::info!(module = "books", book_id = book.id, "book created");
            Ok((StatusCode::CREATED, Json(book)))
        }
        Err(errors) => {
            let fields: Vec<&str> = errors.fields().collect();
            tracing::debug!(
                module = "books",
                fields = ?fields,
                "book submission rejected"
            );
            Err(AppError::field_validation(errors))
        }
    }
}

fn parse_submission(body: &[u8]) -> Result<BookSubmission, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::malformed_body("Request body must be JSON"))?;

    if !value.is_object() {
        return Err(AppError::malformed_body(
            "Request body must be a JSON object",
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::malformed_body(format!("Request body could not be read: {e}")))
}
