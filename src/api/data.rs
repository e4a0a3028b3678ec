//! CSV import/export endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use super::error_response;
use crate::domain::DomainError;
use crate::services::BookService;
use crate::{export, import};

pub async fn import_books(
    State(db): State<DatabaseConnection>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (records, failures) = import::parse_books_csv(&body)
        .map_err(|e| error_response(DomainError::Validation(e)))?;

    let summary = import::import_books(&db, records, failures)
        .await
        .map_err(error_response)?;

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        duplicates = summary.duplicates,
        "CSV import finished"
    );

    Ok(Json(json!({ "summary": summary })))
}

pub async fn export_books(
    State(db): State<DatabaseConnection>,
) -> Result<(HeaderMap, String), (StatusCode, Json<Value>)> {
    let books = BookService::list_books(&db).await.map_err(error_response)?;
    let csv = export::books_to_csv(&books).map_err(error_response)?;

    let filename = format!("books_export_{}.csv", chrono::Utc::now().format("%Y-%m-%d"));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/csv; charset=utf-8".parse().expect("static header"),
    );
    if let Ok(value) = format!("attachment; filename=\"{}\"", filename).parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, csv))
}
