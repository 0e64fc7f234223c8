//! Error types for booklend
//!
//! Every failure falls into one of three severity tiers:
//! - **Rejected**: the request was invalid and nothing changed (bad ISBN, zero quantities)
//! - **NotFound**: the request referenced something that does not exist
//! - **Warning**: persistence trouble; in-memory state stays authoritative

use crate::types::IsbnError;
use std::fmt;
use thiserror::Error;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Input failed validation, operation aborted without state change
    Rejected,
    /// Referenced book or loan does not exist, no state change
    NotFound,
    /// Non-fatal, logged and otherwise ignored
    Warning,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "Rejected"),
            Self::NotFound => write!(f, "Not found"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Main error type for booklend
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Validation Errors =====
    /// ISBN failed validation
    #[error("Invalid ISBN '{value}': {source}")]
    InvalidIsbn {
        value: String,
        #[source]
        source: IsbnError,
    },

    /// A copy count or other quantity is out of range
    #[error("Invalid quantity for {field}: {value} ({reason})")]
    InvalidQuantity {
        field: String,
        value: i64,
        reason: String,
    },

    /// A book field is missing or malformed
    #[error("Invalid book: {reason}")]
    InvalidBook { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    // ===== Lookup Errors =====
    /// No catalog entry for this ISBN
    #[error("Book not found: ISBN {isbn}")]
    BookNotFound { isbn: String },

    /// The ISBN has no active loans at all
    #[error("No borrowed copies found for ISBN {isbn}")]
    NoActiveBorrows { isbn: String },

    /// The ISBN has loans, but none with this id
    #[error("Borrow record {borrow_id} not found for ISBN {isbn}")]
    BorrowNotFound { isbn: String, borrow_id: u64 },

    // ===== Persistence Errors =====
    /// A store could not be written or read
    #[error("Persistence failed for store '{store}': {reason}")]
    PersistenceFailed { store: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidIsbn { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidBook { .. }
            | Self::InvalidConfiguration { .. } => ErrorSeverity::Rejected,

            Self::BookNotFound { .. } | Self::NoActiveBorrows { .. } | Self::BorrowNotFound { .. } => {
                ErrorSeverity::NotFound
            }

            Self::PersistenceFailed { .. } => ErrorSeverity::Warning,
        }
    }

    /// Returns a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidIsbn { source, .. } => match source {
                IsbnError::Empty => {
                    "ISBN cannot be null or empty. Please enter a valid ISBN.".to_string()
                }
                IsbnError::InvalidLength(_) => {
                    "Invalid length for ISBN. Please enter a valid ISBN (10 or 13 digits)."
                        .to_string()
                }
                IsbnError::NonDigit => {
                    "ISBN can only contain numeric digits. Please enter a valid ISBN.".to_string()
                }
            },
            Self::InvalidQuantity { field, .. } => {
                format!("Please enter a valid number for {}.", field)
            }
            Self::InvalidBook { reason } => format!("Cannot add this book: {}.", reason),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::BookNotFound { .. } => "Book not found in the library.".to_string(),
            Self::NoActiveBorrows { .. } => "No borrowed copies of this book.".to_string(),
            Self::BorrowNotFound { borrow_id, .. } => {
                format!("Borrowed book with ID {} not found.", borrow_id)
            }
            Self::PersistenceFailed { .. } => {
                "Library data could not be saved. Changes are kept for this session.".to_string()
            }
        }
    }

    /// Returns true if the error left state untouched because the input was bad
    pub fn is_validation(&self) -> bool {
        self.severity() == ErrorSeverity::Rejected
    }

    /// Returns true if the error refers to a missing book or loan
    pub fn is_not_found(&self) -> bool {
        self.severity() == ErrorSeverity::NotFound
    }

    /// Helper to create an ISBN validation error
    pub fn invalid_isbn(value: impl Into<String>, source: IsbnError) -> Self {
        Self::InvalidIsbn {
            value: value.into(),
            source,
        }
    }

    /// Helper to create a quantity validation error
    pub fn invalid_quantity(field: impl Into<String>, value: i64, reason: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
