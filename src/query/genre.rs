//! Fluent builders for the `book_genres` table.

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Statement, Value};

use super::{already_set, check_id, check_text, must_be_set, ClauseList};
use crate::domain::DomainError;
use crate::models::book_genre;

const TABLE: &str = "book_genres";
const MAX_GENRE: usize = 100;

#[derive(Debug, Default)]
pub struct InsertGenreBuilder {
    clauses: ClauseList,
    book_id: Option<i32>,
    genre: Option<String>,
}

impl InsertGenreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_column("book_id", book_id);
        Ok(self)
    }

    pub fn set_genre(mut self, genre: &str) -> Result<Self, DomainError> {
        check_text("Genre", genre, MAX_GENRE)?;
        if self.genre.is_some() {
            return Err(already_set("Genre"));
        }
        self.genre = Some(genre.to_owned());
        self.clauses.set_column("genre", genre.to_owned());
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        if self.book_id.is_none() {
            return Err(must_be_set("Book ID"));
        }
        if self.genre.is_none() {
            return Err(must_be_set("Genre"));
        }
        Ok(self.clauses.build_insert(TABLE))
    }

    pub async fn insert(self, db: &DatabaseConnection) -> Result<bool, DomainError> {
        let (sql, values) = self.build()?;
        let result = db
            .execute(Statement::from_sql_and_values(
                db.get_database_backend(),
                &sql,
                values,
            ))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
pub struct ReadGenreBuilder {
    clauses: ClauseList,
    id: Option<i32>,
    book_id: Option<i32>,
    genre: Option<String>,
}

impl ReadGenreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_id(mut self, id: i32) -> Result<Self, DomainError> {
        check_id("Genre ID", id)?;
        if self.id.is_some() {
            return Err(already_set("Genre ID"));
        }
        self.id = Some(id);
        self.clauses.set_field("id", id);
        Ok(self)
    }

    pub fn where_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_field("book_id", book_id);
        Ok(self)
    }

    pub fn where_genre(mut self, genre: &str) -> Result<Self, DomainError> {
        check_text("Genre", genre, MAX_GENRE)?;
        if self.genre.is_some() {
            return Err(already_set("Genre"));
        }
        self.genre = Some(genre.to_owned());
        self.clauses.set_field("genre LIKE ?", format!("{}%", genre));
        Ok(self)
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        self.clauses.build_select(TABLE)
    }

    pub async fn read(self, db: &DatabaseConnection) -> Result<Vec<book_genre::Model>, DomainError> {
        let (sql, values) = self.build();
        let rows = book_genre::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                db.get_database_backend(),
                &sql,
                values,
            ))
            .all(db)
            .await?;
        Ok(rows)
    }
}

#[derive(Debug, Default)]
pub struct UpdateGenreBuilder {
    clauses: ClauseList,
    id: Option<i32>,
    book_id: Option<i32>,
    genre: Option<String>,
}

impl UpdateGenreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_id(mut self, id: i32) -> Result<Self, DomainError> {
        check_id("Genre ID", id)?;
        if self.id.is_some() {
            return Err(already_set("Genre ID"));
        }
        self.id = Some(id);
        Ok(self)
    }

    pub fn set_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_field("book_id", book_id);
        Ok(self)
    }

    pub fn set_genre(mut self, genre: &str) -> Result<Self, DomainError> {
        check_text("Genre", genre, MAX_GENRE)?;
        if self.genre.is_some() {
            return Err(already_set("Genre"));
        }
        self.genre = Some(genre.to_owned());
        self.clauses.set_field("genre", genre.to_owned());
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        let id = self.id.ok_or_else(|| must_be_set("Genre ID"))?;
        if self.clauses.is_empty() {
            return Err(DomainError::BuilderState(
                "At least one field must be set for update".to_owned(),
            ));
        }
        Ok(self.clauses.build_update(TABLE, id))
    }

    pub async fn update(self, db: &DatabaseConnection) -> Result<bool, DomainError> {
        let (sql, values) = self.build()?;
        let result = db
            .execute(Statement::from_sql_and_values(
                db.get_database_backend(),
                &sql,
                values,
            ))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
pub struct DeleteGenreBuilder {
    clauses: ClauseList,
    id: Option<i32>,
    book_id: Option<i32>,
    genre: Option<String>,
}

impl DeleteGenreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_id(mut self, id: i32) -> Result<Self, DomainError> {
        check_id("Genre ID", id)?;
        if self.id.is_some() {
            return Err(already_set("Genre ID"));
        }
        self.id = Some(id);
        self.clauses.set_field("id", id);
        Ok(self)
    }

    pub fn where_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_field("book_id", book_id);
        Ok(self)
    }

    pub fn where_genre(mut self, genre: &str) -> Result<Self, DomainError> {
        check_text("Genre", genre, MAX_GENRE)?;
        if self.genre.is_some() {
            return Err(already_set("Genre"));
        }
        self.genre = Some(genre.to_owned());
        self.clauses.set_field("genre", genre.to_owned());
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        if self.clauses.is_empty() {
            return Err(DomainError::BuilderState(
                "At least one condition must be set for deletion".to_owned(),
            ));
        }
        Ok(self.clauses.build_delete(TABLE))
    }

    pub async fn delete(self, db: &DatabaseConnection) -> Result<bool, DomainError> {
        let (sql, values) = self.build()?;
        let result = db
            .execute(Statement::from_sql_and_values(
                db.get_database_backend(),
                &sql,
                values,
            ))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_genre_is_prefix_matched() {
        let builder = ReadGenreBuilder::new().where_genre("Sci").unwrap();
        let (sql, _) = builder.build();
        assert_eq!(sql, "SELECT * FROM book_genres WHERE genre LIKE ?");
    }

    #[test]
    fn insert_requires_both_fields() {
        assert!(InsertGenreBuilder::new()
            .set_book_id(1)
            .unwrap()
            .build()
            .is_err());
    }

    #[test]
    fn book_id_must_be_positive() {
        assert!(ReadGenreBuilder::new().where_book_id(0).is_err());
    }
}
