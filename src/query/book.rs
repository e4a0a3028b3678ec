//! Fluent builders for the `books` table.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Statement, Value};

use super::{already_set, check_id, check_text, check_year, must_be_set, ClauseList};
use crate::domain::DomainError;
use crate::models::book;

const TABLE: &str = "books";
const MAX_TEXT: usize = 255;
const MAX_ISBN: usize = 13;

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

/// Builder for inserting a book row. All four fields are required.
#[derive(Debug, Default)]
pub struct InsertBookBuilder {
    clauses: ClauseList,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    year_published: Option<i32>,
}

impl InsertBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(mut self, title: &str) -> Result<Self, DomainError> {
        check_text("Title", title, MAX_TEXT)?;
        if self.title.is_some() {
            return Err(already_set("Title"));
        }
        self.title = Some(title.to_owned());
        self.clauses.set_column("title", title.to_owned());
        Ok(self)
    }

    pub fn set_author(mut self, author: &str) -> Result<Self, DomainError> {
        check_text("Author", author, MAX_TEXT)?;
        if self.author.is_some() {
            return Err(already_set("Author"));
        }
        self.author = Some(author.to_owned());
        self.clauses.set_column("author", author.to_owned());
        Ok(self)
    }

    pub fn set_isbn(mut self, isbn: &str) -> Result<Self, DomainError> {
        check_text("ISBN", isbn, MAX_ISBN)?;
        if self.isbn.is_some() {
            return Err(already_set("ISBN"));
        }
        self.isbn = Some(isbn.to_owned());
        self.clauses.set_column("isbn", isbn.to_owned());
        Ok(self)
    }

    pub fn set_year_published(mut self, year: i32) -> Result<Self, DomainError> {
        check_year(year)?;
        if self.year_published.is_some() {
            return Err(already_set("Year published"));
        }
        self.year_published = Some(year);
        self.clauses.set_column("year_published", year);
        Ok(self)
    }

    /// Assembles the INSERT statement, or fails if a required field is missing.
    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        if self.title.is_none() {
            return Err(must_be_set("Title"));
        }
        if self.author.is_none() {
            return Err(must_be_set("Author"));
        }
        if self.isbn.is_none() {
            return Err(must_be_set("ISBN"));
        }
        if self.year_published.is_none() {
            return Err(must_be_set("Year published"));
        }
        Ok(self.clauses.build_insert(TABLE))
    }

    pub async fn insert(mut self, db: &DatabaseConnection) -> Result<bool, DomainError> {
        // Validate required fields before stamping timestamps.
        self.build()?;
        let now = now_stamp();
        self.clauses.set_column("created_at", now.clone());
        self.clauses.set_column("updated_at", now);
        let (sql, values) = self.clauses.build_insert(TABLE);
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

/// Builder for reading book rows; text conditions are prefix matches.
#[derive(Debug, Default)]
pub struct ReadBookBuilder {
    clauses: ClauseList,
    book_id: Option<i32>,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    year_published: Option<i32>,
}

impl ReadBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_field("id", book_id);
        Ok(self)
    }

    pub fn where_title(mut self, title: &str) -> Result<Self, DomainError> {
        check_text("Title", title, MAX_TEXT)?;
        if self.title.is_some() {
            return Err(already_set("Title"));
        }
        self.title = Some(title.to_owned());
        self.clauses.set_field("title LIKE ?", format!("{}%", title));
        Ok(self)
    }

    pub fn where_author(mut self, author: &str) -> Result<Self, DomainError> {
        check_text("Author", author, MAX_TEXT)?;
        if self.author.is_some() {
            return Err(already_set("Author"));
        }
        self.author = Some(author.to_owned());
        self.clauses
            .set_field("author LIKE ?", format!("{}%", author));
        Ok(self)
    }

    pub fn where_isbn(mut self, isbn: &str) -> Result<Self, DomainError> {
        check_text("ISBN", isbn, MAX_ISBN)?;
        if self.isbn.is_some() {
            return Err(already_set("ISBN"));
        }
        self.isbn = Some(isbn.to_owned());
        self.clauses.set_field("isbn LIKE ?", format!("{}%", isbn));
        Ok(self)
    }

    pub fn where_year_published(mut self, year: i32) -> Result<Self, DomainError> {
        check_year(year)?;
        if self.year_published.is_some() {
            return Err(already_set("Year published"));
        }
        self.year_published = Some(year);
        self.clauses.set_field("year_published", year);
        Ok(self)
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        self.clauses.build_select(TABLE)
    }

    pub async fn read(self, db: &DatabaseConnection) -> Result<Vec<book::Model>, DomainError> {
        let (sql, values) = self.build();
        let rows = book::Entity::find()
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

/// Builder for updating a book row, keyed by id.
#[derive(Debug, Default)]
pub struct UpdateBookBuilder {
    clauses: ClauseList,
    book_id: Option<i32>,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    year_published: Option<i32>,
    is_available: Option<bool>,
}

impl UpdateBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        Ok(self)
    }

    pub fn set_title(mut self, title: &str) -> Result<Self, DomainError> {
        check_text("Title", title, MAX_TEXT)?;
        if self.title.is_some() {
            return Err(already_set("Title"));
        }
        self.title = Some(title.to_owned());
        self.clauses.set_field("title", title.to_owned());
        Ok(self)
    }

    pub fn set_author(mut self, author: &str) -> Result<Self, DomainError> {
        check_text("Author", author, MAX_TEXT)?;
        if self.author.is_some() {
            return Err(already_set("Author"));
        }
        self.author = Some(author.to_owned());
        self.clauses.set_field("author", author.to_owned());
        Ok(self)
    }

    pub fn set_isbn(mut self, isbn: &str) -> Result<Self, DomainError> {
        check_text("ISBN", isbn, MAX_ISBN)?;
        if self.isbn.is_some() {
            return Err(already_set("ISBN"));
        }
        self.isbn = Some(isbn.to_owned());
        self.clauses.set_field("isbn", isbn.to_owned());
        Ok(self)
    }

    pub fn set_year_published(mut self, year: i32) -> Result<Self, DomainError> {
        check_year(year)?;
        if self.year_published.is_some() {
            return Err(already_set("Year published"));
        }
        self.year_published = Some(year);
        self.clauses.set_field("year_published", year);
        Ok(self)
    }

    pub fn set_is_available(mut self, available: bool) -> Result<Self, DomainError> {
        if self.is_available.is_some() {
            return Err(already_set("is_available"));
        }
        self.is_available = Some(available);
        self.clauses.set_field("is_available", available);
        Ok(self)
    }

    /// Fails before touching the database if no field was set or no id given.
    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        let id = self.book_id.ok_or_else(|| must_be_set("Book ID"))?;
        if self.clauses.is_empty() {
            return Err(DomainError::BuilderState(
                "At least one field must be set for update".to_owned(),
            ));
        }
        Ok(self.clauses.build_update(TABLE, id))
    }

    pub async fn update(mut self, db: &DatabaseConnection) -> Result<bool, DomainError> {
        self.build()?;
        self.clauses.set_field("updated_at", now_stamp());
        let id = self.book_id.unwrap_or_default();
        let (sql, values) = self.clauses.build_update(TABLE, id);
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

/// Builder for deleting book rows; refuses to run without a condition.
#[derive(Debug, Default)]
pub struct DeleteBookBuilder {
    clauses: ClauseList,
    book_id: Option<i32>,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    year_published: Option<i32>,
}

impl DeleteBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_book_id(mut self, book_id: i32) -> Result<Self, DomainError> {
        check_id("Book ID", book_id)?;
        if self.book_id.is_some() {
            return Err(already_set("Book ID"));
        }
        self.book_id = Some(book_id);
        self.clauses.set_field("id", book_id);
        Ok(self)
    }

    pub fn where_title(mut self, title: &str) -> Result<Self, DomainError> {
        check_text("Title", title, MAX_TEXT)?;
        if self.title.is_some() {
            return Err(already_set("Title"));
        }
        self.title = Some(title.to_owned());
        self.clauses.set_field("title", title.to_owned());
        Ok(self)
    }

    pub fn where_author(mut self, author: &str) -> Result<Self, DomainError> {
        check_text("Author", author, MAX_TEXT)?;
        if self.author.is_some() {
            return Err(already_set("Author"));
        }
        self.author = Some(author.to_owned());
        self.clauses.set_field("author", author.to_owned());
        Ok(self)
    }

    pub fn where_isbn(mut self, isbn: &str) -> Result<Self, DomainError> {
        check_text("ISBN", isbn, MAX_ISBN)?;
        if self.isbn.is_some() {
            return Err(already_set("ISBN"));
        }
        self.isbn = Some(isbn.to_owned());
        self.clauses.set_field("isbn", isbn.to_owned());
        Ok(self)
    }

    pub fn where_year_published(mut self, year: i32) -> Result<Self, DomainError> {
        check_year(year)?;
        if self.year_published.is_some() {
            return Err(already_set("Year published"));
        }
        self.year_published = Some(year);
        self.clauses.set_field("year_published", year);
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
    fn read_text_conditions_are_prefix_matches() {
        let builder = ReadBookBuilder::new()
            .where_title("Du")
            .unwrap()
            .where_year_published(1965)
            .unwrap();
        let (sql, values) = builder.build();
        assert_eq!(
            sql,
            "SELECT * FROM books WHERE title LIKE ? AND year_published = ?"
        );
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn read_rejects_second_title() {
        let err = ReadBookBuilder::new()
            .where_title("Du")
            .unwrap()
            .where_title("Fo")
            .unwrap_err();
        assert_eq!(
            err,
            crate::domain::DomainError::BuilderState("Title has already been set".to_owned())
        );
    }

    #[test]
    fn read_rejects_overlong_isbn() {
        assert!(ReadBookBuilder::new().where_isbn("12345678901234").is_err());
    }

    #[test]
    fn insert_requires_all_fields() {
        let builder = InsertBookBuilder::new()
            .set_title("Dune")
            .unwrap()
            .set_author("Frank Herbert")
            .unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn insert_columns_follow_setter_order() {
        let builder = InsertBookBuilder::new()
            .set_isbn("9780441172719")
            .unwrap()
            .set_title("Dune")
            .unwrap()
            .set_author("Frank Herbert")
            .unwrap()
            .set_year_published(1965)
            .unwrap();
        let (sql, _) = builder.build().unwrap();
        assert_eq!(
            sql,
            "INSERT INTO books (isbn, title, author, year_published) VALUES (?, ?, ?, ?)"
        );
    }

    #[test]
    fn update_without_fields_fails_before_db() {
        let builder = UpdateBookBuilder::new().where_book_id(3).unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn update_without_id_fails() {
        let builder = UpdateBookBuilder::new().set_title("Dune").unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn delete_requires_a_condition() {
        assert!(DeleteBookBuilder::new().build().is_err());
    }

    #[test]
    fn delete_conditions_are_exact() {
        let builder = DeleteBookBuilder::new().where_title("Dune").unwrap();
        let (sql, _) = builder.build().unwrap();
        assert_eq!(sql, "DELETE FROM books WHERE title = ?");
    }
}
