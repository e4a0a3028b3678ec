//! Fluent builders for the `book_loans` table.
//!
//! Dates are bound as `YYYY-MM-DD` text; callers pass `NaiveDate` so a
//! malformed date never reaches the statement.

use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Statement, Value};

use super::{already_set, check_id, must_be_set, ClauseList};
use crate::domain::DomainError;
use crate::models::loan;

const TABLE: &str = "book_loans";
const DATE_FMT: &str = "%Y-%m-%d";

fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Default)]
pub struct InsertLoanBuilder {
    clauses: ClauseList,
    book_id: Option<i32>,
    borrower_id: Option<i32>,
    borrowed_at: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
}

impl InsertLoanBuilder {
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

    pub fn set_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_column("borrower_id", borrower_id);
        Ok(self)
    }

    pub fn set_borrowed_at(mut self, borrowed_at: NaiveDate) -> Result<Self, DomainError> {
        if self.borrowed_at.is_some() {
            return Err(already_set("Borrowed date"));
        }
        self.borrowed_at = Some(borrowed_at);
        self.clauses.set_column("borrowed_at", date_text(borrowed_at));
        Ok(self)
    }

    pub fn set_due_date(mut self, due_date: NaiveDate) -> Result<Self, DomainError> {
        if self.due_date.is_some() {
            return Err(already_set("Due date"));
        }
        self.due_date = Some(due_date);
        self.clauses.set_column("due_date", date_text(due_date));
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        if self.book_id.is_none() {
            return Err(must_be_set("Book ID"));
        }
        if self.borrower_id.is_none() {
            return Err(must_be_set("Borrower ID"));
        }
        if self.borrowed_at.is_none() {
            return Err(must_be_set("Borrowed date"));
        }
        if self.due_date.is_none() {
            return Err(must_be_set("Due date"));
        }
        Ok(self.clauses.build_insert(TABLE))
    }

    pub async fn insert(mut self, db: &DatabaseConnection) -> Result<bool, DomainError> {
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

#[derive(Debug, Default)]
pub struct ReadLoanBuilder {
    clauses: ClauseList,
    loan_id: Option<i32>,
    book_id: Option<i32>,
    borrower_id: Option<i32>,
    borrowed_at: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    returned_at: Option<NaiveDate>,
}

impl ReadLoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_loan_id(mut self, loan_id: i32) -> Result<Self, DomainError> {
        check_id("Loan ID", loan_id)?;
        if self.loan_id.is_some() {
            return Err(already_set("Loan ID"));
        }
        self.loan_id = Some(loan_id);
        self.clauses.set_field("id", loan_id);
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

    pub fn where_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_field("borrower_id", borrower_id);
        Ok(self)
    }

    pub fn where_borrowed_at(mut self, borrowed_at: NaiveDate) -> Result<Self, DomainError> {
        if self.borrowed_at.is_some() {
            return Err(already_set("Borrowed date"));
        }
        self.borrowed_at = Some(borrowed_at);
        self.clauses.set_field("borrowed_at", date_text(borrowed_at));
        Ok(self)
    }

    pub fn where_due_date(mut self, due_date: NaiveDate) -> Result<Self, DomainError> {
        if self.due_date.is_some() {
            return Err(already_set("Due date"));
        }
        self.due_date = Some(due_date);
        self.clauses.set_field("due_date", date_text(due_date));
        Ok(self)
    }

    pub fn where_returned_at(mut self, returned_at: NaiveDate) -> Result<Self, DomainError> {
        if self.returned_at.is_some() {
            return Err(already_set("Returned date"));
        }
        self.returned_at = Some(returned_at);
        self.clauses.set_field("returned_at", date_text(returned_at));
        Ok(self)
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        self.clauses.build_select(TABLE)
    }

    pub async fn read(self, db: &DatabaseConnection) -> Result<Vec<loan::Model>, DomainError> {
        let (sql, values) = self.build();
        let rows = loan::Entity::find()
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
pub struct UpdateLoanBuilder {
    clauses: ClauseList,
    loan_id: Option<i32>,
    borrower_id: Option<i32>,
    borrowed_at: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    returned_at: Option<NaiveDate>,
}

impl UpdateLoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_loan_id(mut self, loan_id: i32) -> Result<Self, DomainError> {
        check_id("Loan ID", loan_id)?;
        if self.loan_id.is_some() {
            return Err(already_set("Loan ID"));
        }
        self.loan_id = Some(loan_id);
        Ok(self)
    }

    pub fn set_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_field("borrower_id", borrower_id);
        Ok(self)
    }

    pub fn set_borrowed_at(mut self, borrowed_at: NaiveDate) -> Result<Self, DomainError> {
        if self.borrowed_at.is_some() {
            return Err(already_set("Borrowed date"));
        }
        self.borrowed_at = Some(borrowed_at);
        self.clauses.set_field("borrowed_at", date_text(borrowed_at));
        Ok(self)
    }

    pub fn set_due_date(mut self, due_date: NaiveDate) -> Result<Self, DomainError> {
        if self.due_date.is_some() {
            return Err(already_set("Due date"));
        }
        self.due_date = Some(due_date);
        self.clauses.set_field("due_date", date_text(due_date));
        Ok(self)
    }

    pub fn set_returned_at(mut self, returned_at: NaiveDate) -> Result<Self, DomainError> {
        if self.returned_at.is_some() {
            return Err(already_set("Returned date"));
        }
        self.returned_at = Some(returned_at);
        self.clauses.set_field("returned_at", date_text(returned_at));
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        let id = self.loan_id.ok_or_else(|| must_be_set("Loan ID"))?;
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
        let id = self.loan_id.unwrap_or_default();
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

#[derive(Debug, Default)]
pub struct DeleteLoanBuilder {
    clauses: ClauseList,
    loan_id: Option<i32>,
    book_id: Option<i32>,
    borrower_id: Option<i32>,
}

impl DeleteLoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_loan_id(mut self, loan_id: i32) -> Result<Self, DomainError> {
        check_id("Loan ID", loan_id)?;
        if self.loan_id.is_some() {
            return Err(already_set("Loan ID"));
        }
        self.loan_id = Some(loan_id);
        self.clauses.set_field("id", loan_id);
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

    pub fn where_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_field("borrower_id", borrower_id);
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

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn insert_requires_borrower() {
        let builder = InsertLoanBuilder::new()
            .set_book_id(1)
            .unwrap()
            .set_borrowed_at(date("2026-08-01"))
            .unwrap()
            .set_due_date(date("2026-08-15"))
            .unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn dates_bind_as_iso_text() {
        let builder = ReadLoanBuilder::new()
            .where_due_date(date("2026-08-15"))
            .unwrap();
        let (sql, values) = builder.build();
        assert_eq!(sql, "SELECT * FROM book_loans WHERE due_date = ?");
        assert_eq!(values, vec![Value::from("2026-08-15".to_owned())]);
    }

    #[test]
    fn update_set_twice_is_rejected() {
        let err = UpdateLoanBuilder::new()
            .set_due_date(date("2026-08-15"))
            .unwrap()
            .set_due_date(date("2026-08-16"))
            .unwrap_err();
        assert_eq!(
            err,
            crate::domain::DomainError::BuilderState("Due date has already been set".to_owned())
        );
    }
}
