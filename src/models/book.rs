use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year_published: i32,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_genre::Entity")]
    Genres,
    #[sea_orm(has_many = "super::loan::Entity")]
    Loans,
}

impl Related<super::book_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genres.def()
    }
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses; genres are enriched by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Option<i32>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year_published: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

fn default_available() -> bool {
    true
}

impl From<Model> for BookDto {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            year_published: model.year_published,
            is_available: model.is_available,
            genres: None,
        }
    }
}

impl From<BookDto> for ActiveModel {
    fn from(book: BookDto) -> Self {
        Self {
            id: book.id.map_or(NotSet, Set),
            title: Set(book.title),
            author: Set(book.author),
            isbn: Set(book.isbn),
            year_published: Set(book.year_published),
            is_available: Set(book.is_available),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
