//! Booklend Library Management
//!
//! Orchestration layer that keeps the book catalog, the borrowing ledger and
//! the library settings together, and writes them to disk after each change.
//!
//! ```no_run
//! use booklend_library::{LibraryService, RemovalMode};
//! use booklend_store::PersistenceGateway;
//!
//! let mut library = LibraryService::open(PersistenceGateway::new("/tmp/booklend"));
//! library.add_book("Dune", "Frank Herbert", "9780441013593", 2)?;
//! # Ok::<(), booklend_library::LibraryError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod service;

pub use catalog::BookCatalog;
pub use error::{LibraryError, LibraryResult};
pub use ledger::{BorrowOutcome, BorrowingLedger, Overdue, OverdueEntry};
pub use service::{AddOutcome, LibraryService, PersistMode, RemovalMode, SearchOutcome};
