//! Loan Service - loan lifecycle, enriched listings and classification

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::models::{book, borrower, loan};
use crate::query::loan::{
    DeleteLoanBuilder, InsertLoanBuilder, ReadLoanBuilder, UpdateLoanBuilder,
};

const DATE_FMT: &str = "%Y-%m-%d";

/// Computed from the loan's dates, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
    Reservation,
}

impl LoanStatus {
    /// Overdue: not yet returned and past due. Reservation: the borrow
    /// date is still in the future. Returned wins over both.
    pub fn classify(
        borrowed_at: Option<NaiveDate>,
        due_date: Option<NaiveDate>,
        returned_at: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if returned_at.is_some() {
            return LoanStatus::Returned;
        }
        if let Some(borrowed) = borrowed_at {
            if borrowed > today {
                return LoanStatus::Reservation;
            }
        }
        if let Some(due) = due_date {
            if due < today {
                return LoanStatus::Overdue;
            }
        }
        LoanStatus::Active
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FMT).ok()
}

/// Loan enriched with the book title and borrower display name.
#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub id: i32,
    pub book_id: i32,
    pub borrower_id: i32,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub book_title: String,
    pub borrower_name: String,
    pub status: LoanStatus,
}

/// Filter for listing loans; `status` matches the panel tabs.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoanFilter {
    pub status: Option<String>,
    pub book_id: Option<i32>,
    pub borrower_id: Option<i32>,
}

pub struct LoanService;

impl LoanService {
    pub fn insert_loan() -> InsertLoanBuilder {
        InsertLoanBuilder::new()
    }

    pub fn read_loan() -> ReadLoanBuilder {
        ReadLoanBuilder::new()
    }

    pub fn update_loan() -> UpdateLoanBuilder {
        UpdateLoanBuilder::new()
    }

    pub fn delete_loan() -> DeleteLoanBuilder {
        DeleteLoanBuilder::new()
    }

    /// Lists loans with book titles and borrower names resolved through
    /// two lookup maps, classified against today's date, optionally
    /// narrowed to one status tab.
    pub async fn list_loans(
        db: &DatabaseConnection,
        filter: LoanFilter,
    ) -> Result<Vec<LoanView>, DomainError> {
        let mut query = loan::Entity::find().order_by_desc(loan::Column::BorrowedAt);
        if let Some(book_id) = filter.book_id {
            query = query.filter(loan::Column::BookId.eq(book_id));
        }
        if let Some(borrower_id) = filter.borrower_id {
            query = query.filter(loan::Column::BorrowerId.eq(borrower_id));
        }
        let loans = query.all(db).await?;

        let book_ids: Vec<i32> = loans.iter().map(|l| l.book_id).collect();
        let borrower_ids: Vec<i32> = loans.iter().map(|l| l.borrower_id).collect();

        let mut title_map: HashMap<i32, String> = HashMap::new();
        if !book_ids.is_empty() {
            for b in book::Entity::find()
                .filter(book::Column::Id.is_in(book_ids))
                .all(db)
                .await?
            {
                title_map.insert(b.id, b.title);
            }
        }

        let mut name_map: HashMap<i32, String> = HashMap::new();
        if !borrower_ids.is_empty() {
            for b in borrower::Entity::find()
                .filter(borrower::Column::Id.is_in(borrower_ids))
                .all(db)
                .await?
            {
                name_map.insert(b.id, b.display_name());
            }
        }

        let today = Local::now().date_naive();
        let mut views: Vec<LoanView> = loans
            .into_iter()
            .map(|l| {
                let status = LoanStatus::classify(
                    parse_date(&l.borrowed_at),
                    parse_date(&l.due_date),
                    l.returned_at.as_deref().and_then(parse_date),
                    today,
                );
                LoanView {
                    book_title: title_map
                        .get(&l.book_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_owned()),
                    borrower_name: name_map
                        .get(&l.borrower_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_owned()),
                    id: l.id,
                    book_id: l.book_id,
                    borrower_id: l.borrower_id,
                    borrowed_at: l.borrowed_at,
                    due_date: l.due_date,
                    returned_at: l.returned_at,
                    status,
                }
            })
            .collect();

        if let Some(status) = filter.status.as_deref() {
            let wanted = match status {
                "all" | "" => None,
                "active" => Some(LoanStatus::Active),
                "overdue" => Some(LoanStatus::Overdue),
                "returned" => Some(LoanStatus::Returned),
                "reservation" | "reservations" => Some(LoanStatus::Reservation),
                other => {
                    return Err(DomainError::Validation(format!(
                        "Unknown loan status '{}'",
                        other
                    )))
                }
            };
            if let Some(wanted) = wanted {
                views.retain(|v| v.status == wanted);
            }
        }

        Ok(views)
    }

    /// Creates a loan and marks the book unavailable. The book must exist
    /// and be available.
    pub async fn create_loan(
        db: &DatabaseConnection,
        book_id: i32,
        borrower_id: i32,
        borrowed_at: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<loan::Model, DomainError> {
        let the_book = book::Entity::find_by_id(book_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        if !the_book.is_available {
            return Err(DomainError::Validation(
                "Book is currently on loan".to_owned(),
            ));
        }
        borrower::Entity::find_by_id(borrower_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Self::insert_loan()
            .set_book_id(book_id)?
            .set_borrower_id(borrower_id)?
            .set_borrowed_at(borrowed_at)?
            .set_due_date(due_date)?
            .insert(db)
            .await?;

        crate::services::BookService::update_book()
            .where_book_id(book_id)?
            .set_is_available(false)?
            .update(db)
            .await?;

        // Re-read for the caller; the builder reports only rows_affected.
        let created = loan::Entity::find()
            .filter(loan::Column::BookId.eq(book_id))
            .filter(loan::Column::BorrowerId.eq(borrower_id))
            .order_by_desc(loan::Column::Id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(created)
    }

    /// Records a return and marks the book available again.
    pub async fn return_loan(
        db: &DatabaseConnection,
        loan_id: i32,
        returned_at: NaiveDate,
    ) -> Result<loan::Model, DomainError> {
        let the_loan = loan::Entity::find_by_id(loan_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        if the_loan.returned_at.is_some() {
            return Err(DomainError::Validation(
                "Loan is already returned".to_owned(),
            ));
        }

        Self::update_loan()
            .where_loan_id(loan_id)?
            .set_returned_at(returned_at)?
            .update(db)
            .await?;

        crate::services::BookService::update_book()
            .where_book_id(the_loan.book_id)?
            .set_is_available(true)?
            .update(db)
            .await?;

        let updated = loan::Entity::find_by_id(loan_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(updated)
    }

    /// Deletes loans one by one, collecting per-item failure messages.
    pub async fn batch_delete(
        db: &DatabaseConnection,
        ids: &[i32],
    ) -> Result<(usize, Vec<String>), DomainError> {
        let mut deleted = 0;
        let mut failures = Vec::new();
        for &id in ids {
            let outcome = match Self::delete_loan().where_loan_id(id) {
                Ok(builder) => builder.delete(db).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(true) => deleted += 1,
                Ok(false) => failures.push(format!("Loan {} not found", id)),
                Err(e) => failures.push(format!("Loan {}: {}", id, e)),
            }
        }
        Ok((deleted, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn overdue_iff_unreturned_and_past_due() {
        let today = date("2026-08-30");
        assert_eq!(
            LoanStatus::classify(Some(date("2026-08-01")), Some(date("2026-08-15")), None, today),
            LoanStatus::Overdue
        );
        // Returned late is not overdue
        assert_eq!(
            LoanStatus::classify(
                Some(date("2026-08-01")),
                Some(date("2026-08-15")),
                Some(date("2026-08-20")),
                today
            ),
            LoanStatus::Returned
        );
        // Due today is not yet overdue
        assert_eq!(
            LoanStatus::classify(Some(date("2026-08-01")), Some(date("2026-08-30")), None, today),
            LoanStatus::Active
        );
    }

    #[test]
    fn reservation_iff_borrowed_in_future() {
        let today = date("2026-08-30");
        assert_eq!(
            LoanStatus::classify(Some(date("2026-09-05")), Some(date("2026-09-20")), None, today),
            LoanStatus::Reservation
        );
        assert_eq!(
            LoanStatus::classify(Some(date("2026-08-30")), Some(date("2026-09-20")), None, today),
            LoanStatus::Active
        );
    }

    #[test]
    fn unparseable_dates_fall_back_to_active() {
        let today = date("2026-08-30");
        assert_eq!(
            LoanStatus::classify(None, None, None, today),
            LoanStatus::Active
        );
    }
}
