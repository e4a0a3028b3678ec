use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrowers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    // Middle name is optional but stored as an empty string, never NULL.
    pub middle_name: String,
    pub last_name: String,
    pub contact_num: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loan::Entity")]
    Loans,
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerDto {
    pub id: Option<i32>,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub contact_num: String,
}

impl From<Model> for BorrowerDto {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            first_name: model.first_name,
            middle_name: model.middle_name,
            last_name: model.last_name,
            contact_num: model.contact_num,
        }
    }
}

impl Model {
    /// "Last, First Middle" display form used by loan listings.
    pub fn display_name(&self) -> String {
        if self.middle_name.is_empty() {
            format!("{}, {}", self.last_name, self.first_name)
        } else {
            format!("{}, {} {}", self.last_name, self.first_name, self.middle_name)
        }
    }
}
