//! ISBN catalog key

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons an ISBN string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IsbnError {
    #[error("ISBN cannot be empty")]
    Empty,

    #[error("ISBN must be 10 or 13 digits long (got {0})")]
    InvalidLength(usize),

    #[error("ISBN can only contain numeric digits")]
    NonDigit,
}

/// Returns true if `isbn` is a well-formed 10 or 13 digit ISBN
///
/// Checksums are not verified; only length and ASCII digits are.
pub fn is_isbn_valid(isbn: &str) -> bool {
    Isbn::check(isbn).is_ok()
}

/// A validated ISBN, the unique key of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// Parses and validates an ISBN
    pub fn parse(value: &str) -> Result<Self, IsbnError> {
        Self::check(value)?;
        Ok(Self(value.to_string()))
    }

    fn check(value: &str) -> Result<(), IsbnError> {
        if value.trim().is_empty() {
            return Err(IsbnError::Empty);
        }
        let length = value.chars().count();
        if length != 10 && length != 13 {
            return Err(IsbnError::InvalidLength(length));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IsbnError::NonDigit);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Isbn {
    type Error = IsbnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::check(&value)?;
        Ok(Self(value))
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}

impl std::str::FromStr for Isbn {
    type Err = IsbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
