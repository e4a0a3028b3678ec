//! Borrower Service - builder factories and the picker search

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::domain::DomainError;
use crate::models::borrower::{self, BorrowerDto};
use crate::query::borrower::{
    DeleteBorrowerBuilder, InsertBorrowerBuilder, ReadBorrowerBuilder, UpdateBorrowerBuilder,
};

pub struct BorrowerService;

impl BorrowerService {
    pub fn insert_borrower() -> InsertBorrowerBuilder {
        InsertBorrowerBuilder::new()
    }

    pub fn read_borrower() -> ReadBorrowerBuilder {
        ReadBorrowerBuilder::new()
    }

    pub fn update_borrower() -> UpdateBorrowerBuilder {
        UpdateBorrowerBuilder::new()
    }

    pub fn delete_borrower() -> DeleteBorrowerBuilder {
        DeleteBorrowerBuilder::new()
    }

    pub async fn list_borrowers(db: &DatabaseConnection) -> Result<Vec<BorrowerDto>, DomainError> {
        let rows = borrower::Entity::find()
            .order_by_asc(borrower::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(BorrowerDto::from).collect())
    }

    pub async fn get_borrower(db: &DatabaseConnection, id: i32) -> Result<BorrowerDto, DomainError> {
        let found = Self::read_borrower().where_borrower_id(id)?.read(db).await?;
        found
            .into_iter()
            .next()
            .map(BorrowerDto::from)
            .ok_or(DomainError::NotFound)
    }

    /// Prefix search across first name, last name and contact number,
    /// merged without duplicates. Backs the loan dialog's borrower picker.
    pub async fn search_borrowers(
        db: &DatabaseConnection,
        term: &str,
    ) -> Result<Vec<BorrowerDto>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            return Self::list_borrowers(db).await;
        }

        let mut merged: Vec<borrower::Model> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut push_all = |found: Vec<borrower::Model>, merged: &mut Vec<borrower::Model>| {
            for model in found {
                if seen.insert(model.id) {
                    merged.push(model);
                }
            }
        };

        push_all(
            Self::read_borrower().where_first_name(term)?.read(db).await?,
            &mut merged,
        );
        push_all(
            Self::read_borrower().where_last_name(term)?.read(db).await?,
            &mut merged,
        );
        if term.chars().all(|c| c.is_ascii_digit()) {
            push_all(
                Self::read_borrower()
                    .where_contact_num(term)?
                    .read(db)
                    .await?,
                &mut merged,
            );
        }

        merged.sort_by_key(|b| b.id);
        Ok(merged.into_iter().map(BorrowerDto::from).collect())
    }
}
