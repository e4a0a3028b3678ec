//! CSV export of the book table view.

use crate::domain::DomainError;
use crate::models::BookDto;

/// Renders books as CSV with a quoted header row and quoted values,
/// mirroring the columns of the catalog table view.
pub fn books_to_csv(books: &[BookDto]) -> Result<String, DomainError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record([
            "ID",
            "Title",
            "Author",
            "ISBN",
            "Year Published",
            "Genres",
            "Available",
        ])
        .map_err(|e| DomainError::Database(format!("CSV write error: {}", e)))?;

    for book in books {
        let genres = book
            .genres
            .as_deref()
            .unwrap_or_default()
            .join("; ");
        writer
            .write_record([
                book.id.map(|id| id.to_string()).unwrap_or_default(),
                book.title.clone(),
                book.author.clone(),
                book.isbn.clone(),
                book.year_published.to_string(),
                genres,
                if book.is_available { "Yes" } else { "No" }.to_owned(),
            ])
            .map_err(|e| DomainError::Database(format!("CSV write error: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Database(format!("CSV write error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Database(format!("CSV encoding: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_values_are_quoted() {
        let books = vec![BookDto {
            id: Some(1),
            title: "Dune \"Deluxe\"".to_owned(),
            author: "Frank Herbert".to_owned(),
            isbn: "9780441172719".to_owned(),
            year_published: 1965,
            is_available: true,
            genres: Some(vec!["Sci-Fi".to_owned(), "Classic".to_owned()]),
        }];
        let csv = books_to_csv(&books).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"ID\",\"Title\",\"Author\",\"ISBN\",\"Year Published\",\"Genres\",\"Available\""
        );
        let row = lines.next().unwrap();
        assert!(row.contains("\"Dune \"\"Deluxe\"\"\""));
        assert!(row.contains("\"Sci-Fi; Classic\""));
        assert!(row.contains("\"Yes\""));
    }
}
