//! Fluent builders for the `borrowers` table.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Statement, Value};

use super::{already_set, check_contact_num, check_id, check_text, must_be_set, ClauseList};
use crate::domain::DomainError;
use crate::models::borrower;

const TABLE: &str = "borrowers";
const MAX_NAME: usize = 256;

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Default)]
pub struct InsertBorrowerBuilder {
    clauses: ClauseList,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    contact_num: Option<String>,
}

impl InsertBorrowerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_first_name(mut self, first_name: &str) -> Result<Self, DomainError> {
        check_text("First name", first_name, MAX_NAME)?;
        if self.first_name.is_some() {
            return Err(already_set("First name"));
        }
        self.first_name = Some(first_name.to_owned());
        self.clauses.set_column("first_name", first_name.to_owned());
        Ok(self)
    }

    /// Middle name is optional and may be empty, but may only be set once.
    pub fn set_middle_name(mut self, middle_name: &str) -> Result<Self, DomainError> {
        if middle_name.len() > MAX_NAME {
            return Err(DomainError::Validation(format!(
                "Middle name cannot exceed {} characters",
                MAX_NAME
            )));
        }
        if self.middle_name.is_some() {
            return Err(already_set("Middle name"));
        }
        self.middle_name = Some(middle_name.to_owned());
        self.clauses
            .set_column("middle_name", middle_name.to_owned());
        Ok(self)
    }

    pub fn set_last_name(mut self, last_name: &str) -> Result<Self, DomainError> {
        check_text("Last name", last_name, MAX_NAME)?;
        if self.last_name.is_some() {
            return Err(already_set("Last name"));
        }
        self.last_name = Some(last_name.to_owned());
        self.clauses.set_column("last_name", last_name.to_owned());
        Ok(self)
    }

    pub fn set_contact_num(mut self, contact_num: &str) -> Result<Self, DomainError> {
        check_contact_num(contact_num)?;
        if self.contact_num.is_some() {
            return Err(already_set("Contact number"));
        }
        self.contact_num = Some(contact_num.to_owned());
        self.clauses
            .set_column("contact_num", contact_num.to_owned());
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        if self.first_name.is_none() {
            return Err(must_be_set("First name"));
        }
        if self.middle_name.is_none() {
            return Err(must_be_set("Middle name"));
        }
        if self.last_name.is_none() {
            return Err(must_be_set("Last name"));
        }
        if self.contact_num.is_none() {
            return Err(must_be_set("Contact number"));
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
pub struct ReadBorrowerBuilder {
    clauses: ClauseList,
    borrower_id: Option<i32>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    contact_num: Option<String>,
}

impl ReadBorrowerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_field("id", borrower_id);
        Ok(self)
    }

    pub fn where_first_name(mut self, first_name: &str) -> Result<Self, DomainError> {
        check_text("First name", first_name, MAX_NAME)?;
        if self.first_name.is_some() {
            return Err(already_set("First name"));
        }
        self.first_name = Some(first_name.to_owned());
        self.clauses
            .set_field("first_name LIKE ?", format!("{}%", first_name));
        Ok(self)
    }

    pub fn where_middle_name(mut self, middle_name: &str) -> Result<Self, DomainError> {
        check_text("Middle name", middle_name, MAX_NAME)?;
        if self.middle_name.is_some() {
            return Err(already_set("Middle name"));
        }
        self.middle_name = Some(middle_name.to_owned());
        self.clauses
            .set_field("middle_name LIKE ?", format!("{}%", middle_name));
        Ok(self)
    }

    pub fn where_last_name(mut self, last_name: &str) -> Result<Self, DomainError> {
        check_text("Last name", last_name, MAX_NAME)?;
        if self.last_name.is_some() {
            return Err(already_set("Last name"));
        }
        self.last_name = Some(last_name.to_owned());
        self.clauses
            .set_field("last_name LIKE ?", format!("{}%", last_name));
        Ok(self)
    }

    pub fn where_contact_num(mut self, contact_num: &str) -> Result<Self, DomainError> {
        if contact_num.trim().is_empty() {
            return Err(DomainError::Validation(
                "Contact number cannot be empty".to_owned(),
            ));
        }
        if self.contact_num.is_some() {
            return Err(already_set("Contact number"));
        }
        self.contact_num = Some(contact_num.to_owned());
        self.clauses
            .set_field("contact_num LIKE ?", format!("{}%", contact_num));
        Ok(self)
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        self.clauses.build_select(TABLE)
    }

    pub async fn read(self, db: &DatabaseConnection) -> Result<Vec<borrower::Model>, DomainError> {
        let (sql, values) = self.build();
        let rows = borrower::Entity::find()
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
pub struct UpdateBorrowerBuilder {
    clauses: ClauseList,
    borrower_id: Option<i32>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    contact_num: Option<String>,
}

impl UpdateBorrowerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        Ok(self)
    }

    pub fn set_first_name(mut self, first_name: &str) -> Result<Self, DomainError> {
        check_text("First name", first_name, MAX_NAME)?;
        if self.first_name.is_some() {
            return Err(already_set("First name"));
        }
        self.first_name = Some(first_name.to_owned());
        self.clauses.set_field("first_name", first_name.to_owned());
        Ok(self)
    }

    pub fn set_middle_name(mut self, middle_name: &str) -> Result<Self, DomainError> {
        if middle_name.len() > MAX_NAME {
            return Err(DomainError::Validation(format!(
                "Middle name cannot exceed {} characters",
                MAX_NAME
            )));
        }
        if self.middle_name.is_some() {
            return Err(already_set("Middle name"));
        }
        self.middle_name = Some(middle_name.to_owned());
        self.clauses
            .set_field("middle_name", middle_name.to_owned());
        Ok(self)
    }

    pub fn set_last_name(mut self, last_name: &str) -> Result<Self, DomainError> {
        check_text("Last name", last_name, MAX_NAME)?;
        if self.last_name.is_some() {
            return Err(already_set("Last name"));
        }
        self.last_name = Some(last_name.to_owned());
        self.clauses.set_field("last_name", last_name.to_owned());
        Ok(self)
    }

    pub fn set_contact_num(mut self, contact_num: &str) -> Result<Self, DomainError> {
        check_contact_num(contact_num)?;
        if self.contact_num.is_some() {
            return Err(already_set("Contact number"));
        }
        self.contact_num = Some(contact_num.to_owned());
        self.clauses
            .set_field("contact_num", contact_num.to_owned());
        Ok(self)
    }

    pub fn build(&self) -> Result<(String, Vec<Value>), DomainError> {
        let id = self.borrower_id.ok_or_else(|| must_be_set("Borrower ID"))?;
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
        let id = self.borrower_id.unwrap_or_default();
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
pub struct DeleteBorrowerBuilder {
    clauses: ClauseList,
    borrower_id: Option<i32>,
    contact_num: Option<String>,
}

impl DeleteBorrowerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_borrower_id(mut self, borrower_id: i32) -> Result<Self, DomainError> {
        check_id("Borrower ID", borrower_id)?;
        if self.borrower_id.is_some() {
            return Err(already_set("Borrower ID"));
        }
        self.borrower_id = Some(borrower_id);
        self.clauses.set_field("id", borrower_id);
        Ok(self)
    }

    pub fn where_contact_num(mut self, contact_num: &str) -> Result<Self, DomainError> {
        check_contact_num(contact_num)?;
        if self.contact_num.is_some() {
            return Err(already_set("Contact number"));
        }
        self.contact_num = Some(contact_num.to_owned());
        self.clauses
            .set_field("contact_num", contact_num.to_owned());
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
    fn contact_num_must_be_eleven_digits() {
        assert!(InsertBorrowerBuilder::new()
            .set_contact_num("0917123456")
            .is_err());
        assert!(InsertBorrowerBuilder::new()
            .set_contact_num("09171234567")
            .is_ok());
    }

    #[test]
    fn middle_name_may_be_empty_but_only_once() {
        let builder = InsertBorrowerBuilder::new().set_middle_name("").unwrap();
        assert!(builder.set_middle_name("").is_err());
    }

    #[test]
    fn insert_requires_middle_name_to_be_set() {
        let builder = InsertBorrowerBuilder::new()
            .set_first_name("Juan")
            .unwrap()
            .set_last_name("Dela Cruz")
            .unwrap()
            .set_contact_num("09171234567")
            .unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn read_names_are_prefix_matched() {
        let builder = ReadBorrowerBuilder::new().where_last_name("Dela").unwrap();
        let (sql, _) = builder.build();
        assert_eq!(sql, "SELECT * FROM borrowers WHERE last_name LIKE ?");
    }
}
