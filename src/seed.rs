use crate::models::{book, book_genre, borrower};
use sea_orm::*;

/// Insert a small demo catalog. Intended for fresh databases; duplicate
/// titles are possible if run twice.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let books = vec![
        ("The Hobbit", "J.R.R. Tolkien", "9780261103344", 1937, vec!["Fantasy"]),
        ("Dune", "Frank Herbert", "9780441172719", 1965, vec!["Sci-Fi", "Classic"]),
        (
            "Foundation",
            "Isaac Asimov",
            "9780553293357",
            1951,
            vec!["Sci-Fi"],
        ),
    ];

    for (title, author, isbn, year, genres) in books {
        let model = book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            isbn: Set(isbn.to_owned()),
            year_published: Set(year),
            is_available: Set(true),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        let res = book::Entity::insert(model).exec(db).await?;

        for genre in genres {
            let genre_model = book_genre::ActiveModel {
                book_id: Set(res.last_insert_id),
                genre: Set(genre.to_owned()),
                ..Default::default()
            };
            book_genre::Entity::insert(genre_model).exec(db).await?;
        }
    }

    let borrowers = vec![
        ("Ada", "", "Lovelace", "09170000001"),
        ("Grace", "Murray", "Hopper", "09170000002"),
    ];

    for (first, middle, last, contact) in borrowers {
        let model = borrower::ActiveModel {
            first_name: Set(first.to_owned()),
            middle_name: Set(middle.to_owned()),
            last_name: Set(last.to_owned()),
            contact_num: Set(contact.to_owned()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        borrower::Entity::insert(model).exec(db).await?;
    }

    Ok(())
}
