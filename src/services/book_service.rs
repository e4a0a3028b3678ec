//! Book Service - builder factories and composed catalog operations

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::book::{self, BookDto};
use crate::models::book_genre;
use crate::query::book::{
    DeleteBookBuilder, InsertBookBuilder, ReadBookBuilder, UpdateBookBuilder,
};

/// Search criterion offered by the catalog search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCriteria {
    #[default]
    All,
    Title,
    Author,
    Isbn,
    Year,
    Genre,
}

pub struct BookService;

impl BookService {
    pub fn insert_book() -> InsertBookBuilder {
        InsertBookBuilder::new()
    }

    pub fn read_book() -> ReadBookBuilder {
        ReadBookBuilder::new()
    }

    pub fn update_book() -> UpdateBookBuilder {
        UpdateBookBuilder::new()
    }

    pub fn delete_book() -> DeleteBookBuilder {
        DeleteBookBuilder::new()
    }

    /// Lists every book with its genres attached (two-query pattern).
    pub async fn list_books(db: &DatabaseConnection) -> Result<Vec<BookDto>, DomainError> {
        let books = book::Entity::find()
            .order_by_asc(book::Column::Id)
            .all(db)
            .await?;
        Ok(Self::attach_genres(db, books).await?)
    }

    pub async fn get_book(db: &DatabaseConnection, id: i32) -> Result<BookDto, DomainError> {
        let found = Self::read_book().where_book_id(id)?.read(db).await?;
        let model = found.into_iter().next().ok_or(DomainError::NotFound)?;
        let mut dto = BookDto::from(model);
        dto.genres = Some(Self::genres_of(db, id).await?);
        Ok(dto)
    }

    /// Criterion search with a single term. Text criteria are prefix
    /// matches; year is exact; genre resolves through book_genres; `All`
    /// merges per-criterion hits without duplicates. An empty term lists
    /// everything.
    pub async fn search_books(
        db: &DatabaseConnection,
        criteria: SearchCriteria,
        term: &str,
    ) -> Result<Vec<BookDto>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            return Self::list_books(db).await;
        }

        let books = match criteria {
            SearchCriteria::Title => {
                Self::read_book().where_title(term)?.read(db).await?
            }
            SearchCriteria::Author => {
                Self::read_book().where_author(term)?.read(db).await?
            }
            SearchCriteria::Isbn => Self::read_book().where_isbn(term)?.read(db).await?,
            SearchCriteria::Year => {
                let year: i32 = term.parse().map_err(|_| {
                    DomainError::Validation(format!("'{}' is not a valid year", term))
                })?;
                Self::read_book()
                    .where_year_published(year)?
                    .read(db)
                    .await?
            }
            SearchCriteria::Genre => Self::books_by_genre(db, term).await?,
            SearchCriteria::All => {
                let mut merged: Vec<book::Model> = Vec::new();
                let mut seen = std::collections::HashSet::new();
                let mut push_all = |found: Vec<book::Model>, merged: &mut Vec<book::Model>| {
                    for model in found {
                        if seen.insert(model.id) {
                            merged.push(model);
                        }
                    }
                };
                push_all(
                    Self::read_book().where_title(term)?.read(db).await?,
                    &mut merged,
                );
                push_all(
                    Self::read_book().where_author(term)?.read(db).await?,
                    &mut merged,
                );
                if term.len() <= 13 {
                    push_all(
                        Self::read_book().where_isbn(term)?.read(db).await?,
                        &mut merged,
                    );
                }
                if let Ok(year) = term.parse::<i32>() {
                    if year >= 0 {
                        push_all(
                            Self::read_book()
                                .where_year_published(year)?
                                .read(db)
                                .await?,
                            &mut merged,
                        );
                    }
                }
                push_all(Self::books_by_genre(db, term).await?, &mut merged);
                merged.sort_by_key(|b| b.id);
                merged
            }
        };

        Ok(Self::attach_genres(db, books).await?)
    }

    async fn books_by_genre(
        db: &DatabaseConnection,
        term: &str,
    ) -> Result<Vec<book::Model>, DomainError> {
        let genre_rows = crate::query::genre::ReadGenreBuilder::new()
            .where_genre(term)?
            .read(db)
            .await?;
        let book_ids: Vec<i32> = genre_rows.into_iter().map(|g| g.book_id).collect();
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }
        let books = book::Entity::find()
            .filter(book::Column::Id.is_in(book_ids))
            .order_by_asc(book::Column::Id)
            .all(db)
            .await?;
        Ok(books)
    }

    pub async fn genres_of(db: &DatabaseConnection, book_id: i32) -> Result<Vec<String>, DomainError> {
        let rows = book_genre::Entity::find()
            .filter(book_genre::Column::BookId.eq(book_id))
            .order_by_asc(book_genre::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|g| g.genre).collect())
    }

    async fn attach_genres(
        db: &DatabaseConnection,
        books: Vec<book::Model>,
    ) -> Result<Vec<BookDto>, DomainError> {
        let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();

        let mut genre_map: HashMap<i32, Vec<String>> = HashMap::new();
        if !book_ids.is_empty() {
            let genres = book_genre::Entity::find()
                .filter(book_genre::Column::BookId.is_in(book_ids))
                .order_by_asc(book_genre::Column::Id)
                .all(db)
                .await?;
            for row in genres {
                genre_map.entry(row.book_id).or_default().push(row.genre);
            }
        }

        Ok(books
            .into_iter()
            .map(|model| {
                let genres = genre_map.remove(&model.id).unwrap_or_default();
                let mut dto = BookDto::from(model);
                dto.genres = Some(genres);
                dto
            })
            .collect())
    }

    /// Deletes books one by one, collecting per-item failure messages.
    /// Already-applied deletes are not rolled back.
    pub async fn batch_delete(
        db: &DatabaseConnection,
        ids: &[i32],
    ) -> Result<(usize, Vec<String>), DomainError> {
        let mut deleted = 0;
        let mut failures = Vec::new();
        for &id in ids {
            let outcome = match Self::delete_book().where_book_id(id) {
                Ok(builder) => builder.delete(db).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(true) => deleted += 1,
                Ok(false) => failures.push(format!("Book {} not found", id)),
                Err(e) => failures.push(format!("Book {}: {}", id, e)),
            }
        }
        Ok((deleted, failures))
    }
}
