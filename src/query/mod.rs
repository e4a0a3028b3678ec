//! Query-builder layer
//!
//! Per entity, four fluent builders (insert/read/update/delete) accumulate
//! `"column = ?"` fragments with bound values, then assemble exactly one
//! parameterized statement and execute it against the shared connection.
//!
//! Setters validate their argument and refuse a second call for the same
//! field; both fail before any SQL is issued. Read conditions on text
//! columns are prefix matches (`LIKE 'term%'`), ids and years are exact.

pub mod book;
pub mod borrower;
pub mod genre;
pub mod loan;

use sea_orm::Value;

use crate::domain::DomainError;

/// Accumulates SQL fragments and their bound values.
///
/// A fragment that already carries a `?` placeholder is taken verbatim
/// (e.g. `"title LIKE ?"`); anything else is treated as a column name and
/// expanded to `"column = ?"`. Insert builders push bare column names via
/// [`ClauseList::set_column`] instead.
#[derive(Debug, Default)]
pub(crate) struct ClauseList {
    fragments: Vec<String>,
    values: Vec<Value>,
}

impl ClauseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, fragment: &str, value: impl Into<Value>) {
        if fragment.contains('?') {
            self.fragments.push(fragment.to_owned());
        } else {
            self.fragments.push(format!("{} = ?", fragment));
        }
        self.values.push(value.into());
    }

    /// Records a bare column for INSERT assembly.
    pub fn set_column(&mut self, column: &str, value: impl Into<Value>) {
        self.fragments.push(column.to_owned());
        self.values.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// `SELECT * FROM <table>` with fragments joined by ` AND `.
    pub fn build_select(&self, table: &str) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT * FROM {}", table);
        if !self.fragments.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.fragments.join(" AND "));
        }
        (sql, self.values.clone())
    }

    /// `INSERT INTO <table> (cols...) VALUES (?...)` in setter order.
    pub fn build_insert(&self, table: &str) -> (String, Vec<Value>) {
        let placeholders = vec!["?"; self.fragments.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            self.fragments.join(", "),
            placeholders
        );
        (sql, self.values.clone())
    }

    /// `UPDATE <table> SET frag, frag WHERE id = ?`.
    pub fn build_update(&self, table: &str, id: i32) -> (String, Vec<Value>) {
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table,
            self.fragments.join(", ")
        );
        let mut values = self.values.clone();
        values.push(id.into());
        (sql, values)
    }

    /// `DELETE FROM <table> WHERE frag AND frag`.
    pub fn build_delete(&self, table: &str) -> (String, Vec<Value>) {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            table,
            self.fragments.join(" AND ")
        );
        (sql, self.values.clone())
    }
}

pub(crate) fn check_text(field: &str, value: &str, max_len: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }
    if value.len() > max_len {
        return Err(DomainError::Validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(())
}

pub(crate) fn check_id(field: &str, id: i32) -> Result<(), DomainError> {
    if id <= 0 {
        return Err(DomainError::Validation(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(())
}

pub(crate) fn check_year(year: i32) -> Result<(), DomainError> {
    if year < 0 {
        return Err(DomainError::Validation(
            "Year published cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

/// Philippine standard: exactly 11 digits.
pub(crate) fn check_contact_num(contact_num: &str) -> Result<(), DomainError> {
    if contact_num.trim().is_empty() {
        return Err(DomainError::Validation(
            "Contact number cannot be empty".to_owned(),
        ));
    }
    if contact_num.len() != 11 {
        return Err(DomainError::Validation(
            "Contact number must be exactly 11 digits".to_owned(),
        ));
    }
    if !contact_num.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::Validation(
            "Contact number must contain only digits".to_owned(),
        ));
    }
    Ok(())
}

pub(crate) fn already_set(field: &str) -> DomainError {
    DomainError::BuilderState(format!("{} has already been set", field))
}

pub(crate) fn must_be_set(field: &str) -> DomainError {
    DomainError::BuilderState(format!("{} must be set", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_expands_bare_column() {
        let mut clauses = ClauseList::new();
        clauses.set_field("title", "Dune".to_owned());
        let (sql, values) = clauses.build_select("books");
        assert_eq!(sql, "SELECT * FROM books WHERE title = ?");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn set_field_keeps_fragment_with_placeholder() {
        let mut clauses = ClauseList::new();
        clauses.set_field("title LIKE ?", "Dune%".to_owned());
        let (sql, _) = clauses.build_select("books");
        assert_eq!(sql, "SELECT * FROM books WHERE title LIKE ?");
    }

    #[test]
    fn select_without_conditions_has_no_where() {
        let clauses = ClauseList::new();
        let (sql, values) = clauses.build_select("books");
        assert_eq!(sql, "SELECT * FROM books");
        assert!(values.is_empty());
    }

    #[test]
    fn conditions_join_with_and() {
        let mut clauses = ClauseList::new();
        clauses.set_field("title LIKE ?", "Du%".to_owned());
        clauses.set_field("year_published", 1965);
        let (sql, _) = clauses.build_select("books");
        assert_eq!(
            sql,
            "SELECT * FROM books WHERE title LIKE ? AND year_published = ?"
        );
    }

    #[test]
    fn update_joins_with_comma_and_appends_id() {
        let mut clauses = ClauseList::new();
        clauses.set_field("title", "Dune".to_owned());
        clauses.set_field("author", "Frank Herbert".to_owned());
        let (sql, values) = clauses.build_update("books", 7);
        assert_eq!(sql, "UPDATE books SET title = ?, author = ? WHERE id = ?");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn insert_uses_setter_order() {
        let mut clauses = ClauseList::new();
        clauses.set_column("book_id", 3);
        clauses.set_column("genre", "Sci-Fi".to_owned());
        let (sql, values) = clauses.build_insert("book_genres");
        assert_eq!(sql, "INSERT INTO book_genres (book_id, genre) VALUES (?, ?)");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn contact_num_rules() {
        assert!(check_contact_num("09171234567").is_ok());
        assert!(check_contact_num("0917123456").is_err()); // 10 digits
        assert!(check_contact_num("09171234a67").is_err());
        assert!(check_contact_num("").is_err());
    }
}
