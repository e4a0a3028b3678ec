//! Genre Service - builder factories plus case-insensitive attach/dedup

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::DomainError;
use crate::models::book_genre;
use crate::query::genre::{
    DeleteGenreBuilder, InsertGenreBuilder, ReadGenreBuilder, UpdateGenreBuilder,
};

pub struct GenreService;

impl GenreService {
    pub fn insert_genre() -> InsertGenreBuilder {
        InsertGenreBuilder::new()
    }

    pub fn read_genre() -> ReadGenreBuilder {
        ReadGenreBuilder::new()
    }

    pub fn update_genre() -> UpdateGenreBuilder {
        UpdateGenreBuilder::new()
    }

    pub fn delete_genre() -> DeleteGenreBuilder {
        DeleteGenreBuilder::new()
    }

    pub async fn genres_for_book(
        db: &DatabaseConnection,
        book_id: i32,
    ) -> Result<Vec<book_genre::Model>, DomainError> {
        let rows = book_genre::Entity::find()
            .filter(book_genre::Column::BookId.eq(book_id))
            .all(db)
            .await?;
        Ok(rows)
    }

    /// Attaches a genre to a book unless an equal genre (ignoring case)
    /// already exists. Returns false when skipped as a duplicate.
    pub async fn attach_genre(
        db: &DatabaseConnection,
        book_id: i32,
        genre: &str,
    ) -> Result<bool, DomainError> {
        let genre = genre.trim();
        let existing = Self::genres_for_book(db, book_id).await?;
        let normalized = genre.to_lowercase();
        if existing
            .iter()
            .any(|g| g.genre.trim().to_lowercase() == normalized)
        {
            return Ok(false);
        }
        Self::insert_genre()
            .set_book_id(book_id)?
            .set_genre(genre)?
            .insert(db)
            .await
    }
}
