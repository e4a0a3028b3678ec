pub mod book;
pub mod book_genre;
pub mod borrower;
pub mod loan;

pub use book::BookDto;
pub use book_genre::GenreDto;
pub use borrower::BorrowerDto;
pub use loan::LoanDto;
