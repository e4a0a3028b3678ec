use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_response;
use crate::models::book;
use crate::services::{BookService, GenreService, SearchCriteria};

pub async fn list_books(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let books = BookService::list_books(&db).await.map_err(error_response)?;
    Ok(Json(json!({
        "books": books,
        "total": books.len()
    })))
}

pub async fn get_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let found = BookService::get_book(&db, id).await.map_err(error_response)?;
    Ok(Json(json!({ "book": found })))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year_published: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

pub async fn create_book(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let inner = || async {
        BookService::insert_book()
            .set_title(&payload.title)?
            .set_author(&payload.author)?
            .set_isbn(&payload.isbn)?
            .set_year_published(payload.year_published)?
            .insert(&db)
            .await
    };
    inner().await.map_err(error_response)?;

    // The builder reports only rows_affected; re-read the created row.
    let created = book::Entity::find()
        .filter(book::Column::Isbn.eq(payload.isbn.as_str()))
        .order_by_desc(book::Column::Id)
        .one(&db)
        .await
        .map_err(|e| error_response(e.into()))?
        .ok_or_else(|| error_response(crate::domain::DomainError::NotFound))?;

    for genre in &payload.genres {
        GenreService::attach_genre(&db, created.id, genre)
            .await
            .map_err(error_response)?;
    }

    let dto = BookService::get_book(&db, created.id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Book created successfully", "book": dto })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
    pub is_available: Option<bool>,
}

pub async fn update_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async {
        let mut builder = BookService::update_book().where_book_id(id)?;
        if let Some(title) = &payload.title {
            builder = builder.set_title(title)?;
        }
        if let Some(author) = &payload.author {
            builder = builder.set_author(author)?;
        }
        if let Some(isbn) = &payload.isbn {
            builder = builder.set_isbn(isbn)?;
        }
        if let Some(year) = payload.year_published {
            builder = builder.set_year_published(year)?;
        }
        if let Some(available) = payload.is_available {
            builder = builder.set_is_available(available)?;
        }
        builder.update(&db).await
    };

    let updated = inner().await.map_err(error_response)?;
    if !updated {
        return Err(error_response(crate::domain::DomainError::NotFound));
    }
    let dto = BookService::get_book(&db, id).await.map_err(error_response)?;
    Ok(Json(json!({ "message": "Book updated successfully", "book": dto })))
}

pub async fn delete_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async { BookService::delete_book().where_book_id(id)?.delete(&db).await };
    let deleted = inner().await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(crate::domain::DomainError::NotFound));
    }
    Ok(Json(json!({ "message": "Book deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub criteria: SearchCriteria,
    #[serde(default)]
    pub q: String,
}

pub async fn search_books(
    State(db): State<DatabaseConnection>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let books = BookService::search_books(&db, params.criteria, &params.q)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "books": books,
        "total": books.len()
    })))
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<i32>,
}

pub async fn batch_delete_books(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<BatchDeleteRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (deleted, failures) = BookService::batch_delete(&db, &payload.ids)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({
        "deleted": deleted,
        "failures": failures
    })))
}
