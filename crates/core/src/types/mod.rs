//! Domain types for booklend
//!
//! - `book`: catalog entries and their copy counts
//! - `borrow`: borrow identifiers and active loan records
//! - `isbn`: the validated catalog key
//! - `common`: shared traits

mod book;
mod borrow;
mod common;
mod isbn;

pub use book::Book;
pub use borrow::{BorrowId, BorrowRecord};
pub use common::Validator;
pub use isbn::{is_isbn_valid, Isbn, IsbnError};
