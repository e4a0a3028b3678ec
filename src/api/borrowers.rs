use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_response;
use crate::models::borrower;
use crate::services::BorrowerService;

pub async fn list_borrowers(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let borrowers = BorrowerService::list_borrowers(&db)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "borrowers": borrowers,
        "total": borrowers.len()
    })))
}

pub async fn get_borrower(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let found = BorrowerService::get_borrower(&db, id)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "borrower": found })))
}

#[derive(Debug, Deserialize)]
pub struct CreateBorrowerRequest {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub contact_num: String,
}

pub async fn create_borrower(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateBorrowerRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let inner = || async {
        BorrowerService::insert_borrower()
            .set_first_name(&payload.first_name)?
            .set_middle_name(&payload.middle_name)?
            .set_last_name(&payload.last_name)?
            .set_contact_num(&payload.contact_num)?
            .insert(&db)
            .await
    };
    inner().await.map_err(error_response)?;

    let created = borrower::Entity::find()
        .filter(borrower::Column::ContactNum.eq(payload.contact_num.as_str()))
        .order_by_desc(borrower::Column::Id)
        .one(&db)
        .await
        .map_err(|e| error_response(e.into()))?
        .ok_or_else(|| error_response(crate::domain::DomainError::NotFound))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Borrower created successfully",
            "borrower": crate::models::BorrowerDto::from(created)
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBorrowerRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_num: Option<String>,
}

pub async fn update_borrower(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBorrowerRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async {
        let mut builder = BorrowerService::update_borrower().where_borrower_id(id)?;
        if let Some(first_name) = &payload.first_name {
            builder = builder.set_first_name(first_name)?;
        }
        if let Some(middle_name) = &payload.middle_name {
            builder = builder.set_middle_name(middle_name)?;
        }
        if let Some(last_name) = &payload.last_name {
            builder = builder.set_last_name(last_name)?;
        }
        if let Some(contact_num) = &payload.contact_num {
            builder = builder.set_contact_num(contact_num)?;
        }
        builder.update(&db).await
    };

    let updated = inner().await.map_err(error_response)?;
    if !updated {
        return Err(error_response(crate::domain::DomainError::NotFound));
    }
    let dto = BorrowerService::get_borrower(&db, id)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "message": "Borrower updated successfully",
        "borrower": dto
    })))
}

pub async fn delete_borrower(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async {
        BorrowerService::delete_borrower()
            .where_borrower_id(id)?
            .delete(&db)
            .await
    };
    let deleted = inner().await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(crate::domain::DomainError::NotFound));
    }
    Ok(Json(json!({ "message": "Borrower deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct BorrowerSearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_borrowers(
    State(db): State<DatabaseConnection>,
    Query(params): Query<BorrowerSearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let borrowers = BorrowerService::search_borrowers(&db, &params.q)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "borrowers": borrowers,
        "total": borrowers.len()
    })))
}
