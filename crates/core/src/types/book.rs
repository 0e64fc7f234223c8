//! Book domain model

use crate::types::{Isbn, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog entry: one title, any number of physical copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub copies_available: u32,
    #[serde(default)]
    pub copies_borrowed: u32,
}

impl Book {
    /// Creates a new book with no copies on loan
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: Isbn,
        copies_available: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn,
            copies_available,
            copies_borrowed: 0,
        }
    }

    /// Copies owned by the library, on the shelf or on loan
    pub fn total_copies(&self) -> u64 {
        u64::from(self.copies_available) + u64::from(self.copies_borrowed)
    }

    /// Returns true if at least one copy can be lent out
    pub fn is_available(&self) -> bool {
        self.copies_available > 0
    }

    /// Case-insensitive substring match on title or author
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.author.to_lowercase().contains(&needle)
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title cannot be empty".to_string());
        }

        if self.author.trim().is_empty() {
            errors.push("Author cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} - Copies Available: {}",
            self.title, self.author, self.copies_available
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book::new(
            "The Left Hand of Darkness",
            "Ursula K. Le Guin",
            Isbn::parse("9780441478125").unwrap(),
            3,
        )
    }

    #[test]
    fn test_book_new() {
        let book = sample();
        assert_eq!(book.copies_available, 3);
        assert_eq!(book.copies_borrowed, 0);
        assert_eq!(book.total_copies(), 3);
        assert!(book.is_available());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let book = sample();
        assert!(book.matches("left hand"));
        assert!(book.matches("LE GUIN"));
        assert!(!book.matches("Tolkien"));
    }

    #[test]
    fn test_validation_empty_title() {
        let mut book = sample();
        book.title = "   ".to_string();
        assert!(!book.is_valid());
    }

    #[test]
    fn test_display() {
        let book = sample();
        assert_eq!(
            book.to_string(),
            "The Left Hand of Darkness by Ursula K. Le Guin - Copies Available: 3"
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["isbn"], "9780441478125");
        assert_eq!(json["copiesAvailable"], 3);
        assert_eq!(json["copiesBorrowed"], 0);
    }
}
