//! booklend domain model
//!
//! Plain data types shared by every other crate in the workspace: books,
//! ISBNs, borrow records and the application-wide error taxonomy.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, Result};
pub use types::{is_isbn_valid, Book, BorrowId, BorrowRecord, Isbn, IsbnError, Validator};
