pub mod books;
pub mod borrowers;
pub mod data;
pub mod genres;
pub mod health;
pub mod loans;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::domain::DomainError;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route("/books/batch/delete", post(books::batch_delete_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Genres
        .route(
            "/books/:id/genres",
            get(genres::list_book_genres).post(genres::attach_genre),
        )
        .route("/genres/:id", delete(genres::delete_genre))
        // Borrowers
        .route(
            "/borrowers",
            get(borrowers::list_borrowers).post(borrowers::create_borrower),
        )
        .route("/borrowers/search", get(borrowers::search_borrowers))
        .route(
            "/borrowers/:id",
            get(borrowers::get_borrower)
                .put(borrowers::update_borrower)
                .delete(borrowers::delete_borrower),
        )
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/batch/delete", post(loans::batch_delete_loans))
        .route(
            "/loans/:id",
            axum::routing::put(loans::update_loan).delete(loans::delete_loan),
        )
        .route("/loans/:id/return", post(loans::return_loan))
        // CSV import/export
        .route("/books/import", post(data::import_books))
        .route("/books/export", get(data::export_books))
        .with_state(db)
}

/// Uniform error mapping: validation and builder misuse are client errors,
/// missing rows are 404, everything else surfaces as 500 with the message.
pub(crate) fn error_response(e: DomainError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) | DomainError::BuilderState(_) => StatusCode::BAD_REQUEST,
        DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {}", e);
    }
    (status, Json(json!({ "error": e.to_string() })))
}
