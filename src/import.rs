//! CSV import for books.
//!
//! Expected columns: title, author, isbn, year and an optional genre list
//! (split on `;` or `,`). A leading header row is skipped when it mentions
//! title/author/isbn. Duplicate detection runs first by ISBN, then by
//! (title, author, year); an ISBN hit with differing fields still
//! suppresses insertion. Applied rows are never rolled back.

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::domain::DomainError;
use crate::services::{BookService, GenreService};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub genres: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub failures: Vec<String>,
}

/// Parses CSV content into import records, collecting per-row failures.
pub fn parse_books_csv(content: &[u8]) -> Result<(Vec<ImportRecord>, Vec<String>), String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut first = true;

    for row in reader.records() {
        let row = row.map_err(|e| format!("CSV parse error: {}", e))?;
        let fields: Vec<String> = row.iter().map(|f| f.trim().to_owned()).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        // Header auto-detection on the first non-empty line.
        if first {
            first = false;
            let joined = fields.join("|").to_lowercase();
            if joined.contains("title") || joined.contains("author") || joined.contains("isbn") {
                continue;
            }
        }

        if fields.len() < 4 {
            failures.push(format!("Too few columns: {}", fields.join(",")));
            continue;
        }

        let year: i32 = match fields[3].parse() {
            Ok(y) => y,
            Err(_) => {
                failures.push(format!("Invalid year for: {}", fields[0]));
                continue;
            }
        };

        let genres = if fields.len() >= 5 {
            fields[4]
                .split([';', ','])
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_owned)
                .collect()
        } else {
            Vec::new()
        };

        records.push(ImportRecord {
            title: fields[0].clone(),
            author: fields[1].clone(),
            isbn: fields[2].clone(),
            year,
            genres,
        });
    }

    Ok((records, failures))
}

/// Applies parsed records against the catalog.
pub async fn import_books(
    db: &DatabaseConnection,
    records: Vec<ImportRecord>,
    mut failures: Vec<String>,
) -> Result<ImportSummary, DomainError> {
    let mut summary = ImportSummary {
        skipped: failures.len(),
        ..Default::default()
    };

    for record in records {
        match import_one(db, &record, &mut failures).await {
            Ok(RowOutcome::Imported) => summary.imported += 1,
            Ok(RowOutcome::Duplicate) => summary.duplicates += 1,
            Ok(RowOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                summary.skipped += 1;
                failures.push(format!("Error importing {}: {}", record.title, e));
            }
        }
    }

    summary.failures = failures;
    Ok(summary)
}

enum RowOutcome {
    Imported,
    Duplicate,
    Skipped,
}

async fn import_one(
    db: &DatabaseConnection,
    record: &ImportRecord,
    failures: &mut Vec<String>,
) -> Result<RowOutcome, DomainError> {
    let mut book_id = 0;
    let mut exact_match = false;

    // 1) Match by ISBN first.
    if !record.isbn.is_empty() {
        if let Ok(found) = BookService::read_book().where_isbn(&record.isbn) {
            if let Some(existing) = found.read(db).await?.into_iter().next() {
                book_id = existing.id;
                if existing.title.eq_ignore_ascii_case(record.title.trim())
                    && existing.author.eq_ignore_ascii_case(record.author.trim())
                    && existing.year_published == record.year
                {
                    exact_match = true;
                }
                // Found by ISBN with differing fields: keep the existing
                // row and skip insertion to avoid ISBN duplicates.
            }
        }
    }

    // 2) Match by title + author + year.
    if book_id == 0 {
        let found = BookService::read_book()
            .where_title(&record.title)?
            .where_author(&record.author)?
            .where_year_published(record.year)?
            .read(db)
            .await?;
        if let Some(existing) = found.into_iter().next() {
            book_id = existing.id;
            exact_match = true;
        }
    }

    // 3) Insert when nothing matched, then re-locate the row.
    if book_id == 0 {
        let inserted = BookService::insert_book()
            .set_title(&record.title)?
            .set_author(&record.author)?
            .set_isbn(&record.isbn)?
            .set_year_published(record.year)?
            .insert(db)
            .await
            .unwrap_or(false);

        if !record.isbn.is_empty() {
            if let Some(found) = BookService::read_book()
                .where_isbn(&record.isbn)?
                .read(db)
                .await?
                .into_iter()
                .next()
            {
                book_id = found.id;
            }
        }
        if book_id == 0 {
            if let Some(found) = BookService::read_book()
                .where_title(&record.title)?
                .where_author(&record.author)?
                .where_year_published(record.year)?
                .read(db)
                .await?
                .into_iter()
                .next()
            {
                book_id = found.id;
            }
        }

        if book_id == 0 {
            if !inserted {
                failures.push(format!(
                    "Insert failed and could not locate book: {}",
                    record.title
                ));
            } else {
                failures.push(format!(
                    "Could not determine book id for: {}",
                    record.title
                ));
            }
            return Ok(RowOutcome::Skipped);
        }
    }

    // 4) Attach genres with case-insensitive dedup.
    for genre in &record.genres {
        match GenreService::attach_genre(db, book_id, genre).await {
            Ok(_) => {}
            Err(e) => failures.push(format!(
                "Error inserting genre '{}' for book: {} -> {}",
                genre, record.title, e
            )),
        }
    }

    if exact_match {
        Ok(RowOutcome::Duplicate)
    } else {
        Ok(RowOutcome::Imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped() {
        let csv = b"title,author,isbn,year\nDune,Frank Herbert,9780441172719,1965\n";
        let (records, failures) = parse_books_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert!(failures.is_empty());
        assert_eq!(records[0].title, "Dune");
    }

    #[test]
    fn headerless_first_row_is_data() {
        let csv = b"Dune,Frank Herbert,9780441172719,1965\n";
        let (records, _) = parse_books_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn short_row_is_recorded_as_failure() {
        let csv = b"title,author,isbn,year\nDune,Frank Herbert\n";
        let (records, failures) = parse_books_csv(csv).unwrap();
        assert!(records.is_empty());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Too few columns"));
    }

    #[test]
    fn invalid_year_is_recorded_as_failure() {
        let csv = b"Dune,Frank Herbert,9780441172719,nineteen\n";
        let (records, failures) = parse_books_csv(csv).unwrap();
        assert!(records.is_empty());
        assert_eq!(failures, vec!["Invalid year for: Dune".to_owned()]);
    }

    #[test]
    fn quoted_fields_and_genre_splitting() {
        let csv =
            b"\"Dune, Messiah\",Frank Herbert,9780441172702,1969,\"Sci-Fi; Classic,Space Opera\"\n";
        let (records, _) = parse_books_csv(csv).unwrap();
        assert_eq!(records[0].title, "Dune, Messiah");
        assert_eq!(
            records[0].genres,
            vec!["Sci-Fi", "Classic", "Space Opera"]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let csv = b"\nDune,Frank Herbert,9780441172719,1965\n\n";
        let (records, failures) = parse_books_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert!(failures.is_empty());
    }
}
