use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_response;
use crate::domain::DomainError;
use crate::services::{LoanFilter, LoanService};

const DATE_FMT: &str = "%Y-%m-%d";

fn parse_date(field: &str, text: &str) -> Result<NaiveDate, (StatusCode, Json<Value>)> {
    NaiveDate::parse_from_str(text, DATE_FMT).map_err(|_| {
        error_response(DomainError::Validation(format!(
            "{} must be a YYYY-MM-DD date",
            field
        )))
    })
}

pub async fn list_loans(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<LoanFilter>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let loans = LoanService::list_loans(&db, filter)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "loans": loans,
        "total": loans.len()
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub book_id: i32,
    pub borrower_id: i32,
    pub borrowed_at: String,
    pub due_date: String,
}

pub async fn create_loan(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let borrowed_at = parse_date("borrowed_at", &payload.borrowed_at)?;
    let due_date = parse_date("due_date", &payload.due_date)?;
    if due_date < borrowed_at {
        return Err(error_response(DomainError::Validation(
            "Due date cannot be before the borrow date".to_owned(),
        )));
    }

    let created = LoanService::create_loan(&db, payload.book_id, payload.borrower_id, borrowed_at, due_date)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Loan created successfully", "loan": created })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateLoanRequest {
    pub borrower_id: Option<i32>,
    pub borrowed_at: Option<String>,
    pub due_date: Option<String>,
    pub returned_at: Option<String>,
}

pub async fn update_loan(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLoanRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut builder = LoanService::update_loan()
        .where_loan_id(id)
        .map_err(error_response)?;
    if let Some(borrower_id) = payload.borrower_id {
        builder = builder.set_borrower_id(borrower_id).map_err(error_response)?;
    }
    if let Some(borrowed_at) = &payload.borrowed_at {
        builder = builder
            .set_borrowed_at(parse_date("borrowed_at", borrowed_at)?)
            .map_err(error_response)?;
    }
    if let Some(due_date) = &payload.due_date {
        builder = builder
            .set_due_date(parse_date("due_date", due_date)?)
            .map_err(error_response)?;
    }
    if let Some(returned_at) = &payload.returned_at {
        builder = builder
            .set_returned_at(parse_date("returned_at", returned_at)?)
            .map_err(error_response)?;
    }

    let updated = builder.update(&db).await.map_err(error_response)?;
    if !updated {
        return Err(error_response(DomainError::NotFound));
    }
    Ok(Json(json!({ "message": "Loan updated successfully" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnLoanRequest {
    pub returned_at: Option<String>,
}

pub async fn return_loan(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    payload: Option<Json<ReturnLoanRequest>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let returned_at = match &request.returned_at {
        Some(text) => parse_date("returned_at", text)?,
        None => Local::now().date_naive(),
    };

    let updated = LoanService::return_loan(&db, id, returned_at)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "message": "Loan returned successfully",
        "loan": updated
    })))
}

pub async fn delete_loan(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async { LoanService::delete_loan().where_loan_id(id)?.delete(&db).await };
    let deleted = inner().await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(DomainError::NotFound));
    }
    Ok(Json(json!({ "message": "Loan deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<i32>,
}

pub async fn batch_delete_loans(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<BatchDeleteRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (deleted, failures) = LoanService::batch_delete(&db, &payload.ids)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "deleted": deleted,
        "failures": failures
    })))
}
