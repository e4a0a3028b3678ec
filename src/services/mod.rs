//! Services Layer
//!
//! Pure business logic without the HTTP layer. Each service exposes one
//! builder-factory per CRUD verb plus the composed operations the API
//! surface needs (enriched listings, criterion search, loan lifecycle).

pub mod book_service;
pub mod borrower_service;
pub mod genre_service;
pub mod loan_service;

pub use book_service::{BookService, SearchCriteria};
pub use borrower_service::BorrowerService;
pub use genre_service::GenreService;
pub use loan_service::{LoanFilter, LoanService, LoanStatus, LoanView};
