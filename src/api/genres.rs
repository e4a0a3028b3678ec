use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_response;
use crate::models::book_genre::GenreDto;
use crate::services::GenreService;

pub async fn list_book_genres(
    State(db): State<DatabaseConnection>,
    Path(book_id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let genres = GenreService::genres_for_book(&db, book_id)
        .await
        .map_err(error_response)?;
    let dtos: Vec<GenreDto> = genres.into_iter().map(GenreDto::from).collect();
    Ok(Json(json!({
        "genres": dtos,
        "total": dtos.len()
    })))
}

#[derive(Debug, Deserialize)]
pub struct AttachGenreRequest {
    pub genre: String,
}

pub async fn attach_genre(
    State(db): State<DatabaseConnection>,
    Path(book_id): Path<i32>,
    Json(payload): Json<AttachGenreRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let added = GenreService::attach_genre(&db, book_id, &payload.genre)
        .await
        .map_err(error_response)?;
    if added {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Genre added" })),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Genre already present" })),
        ))
    }
}

pub async fn delete_genre(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inner = || async { GenreService::delete_genre().where_id(id)?.delete(&db).await };
    let deleted = inner().await.map_err(error_response)?;
    if !deleted {
        return Err(error_response(crate::domain::DomainError::NotFound));
    }
    Ok(Json(json!({ "message": "Genre deleted" })))
}
