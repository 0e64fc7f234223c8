//! The set of books the library owns, keyed by ISBN

use crate::error::LibraryResult;
use booklend_core::error::AppError;
use booklend_core::{Book, Isbn};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Books in insertion order, at most one entry per ISBN
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookCatalog {
    books: Vec<Book>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a book, or merges its available copies into an existing entry
    ///
    /// Returns the entry that now holds the copies. Fails without touching
    /// the catalog if the merged count would not fit.
    pub fn add_or_merge(&mut self, book: Book) -> LibraryResult<&Book> {
        match self.books.iter().position(|b| b.isbn == book.isbn) {
            Some(index) => {
                let existing = &mut self.books[index];
                existing.copies_available =
                    merged_count(existing.copies_available, book.copies_available, "copies")?;
                Ok(existing)
            }
            None => {
                self.books.push(book);
                Ok(&self.books[self.books.len() - 1])
            }
        }
    }

    pub fn find_by_isbn(&self, isbn: &Isbn) -> Option<&Book> {
        self.books.iter().find(|b| &b.isbn == isbn)
    }

    pub fn find_by_isbn_mut(&mut self, isbn: &Isbn) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| &b.isbn == isbn)
    }

    /// First book whose title or author contains `query`, ignoring case
    ///
    /// Later matches are never returned; callers wanting a specific book
    /// should look it up by ISBN.
    pub fn find_by_query(&self, query: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.matches(query))
    }

    /// Deletes the entry entirely, returning it
    pub fn remove(&mut self, isbn: &Isbn) -> Option<Book> {
        let index = self.books.iter().position(|b| &b.isbn == isbn)?;
        Some(self.books.remove(index))
    }

    /// Takes `n` copies off the shelf
    ///
    /// Only succeeds when `0 < n < copies_available`; removing every
    /// available copy this way is refused. Returns false without touching
    /// the entry otherwise, or if the ISBN is unknown.
    pub fn decrease_copies(&mut self, isbn: &Isbn, n: u32) -> bool {
        match self.find_by_isbn_mut(isbn) {
            Some(book) if n > 0 && n < book.copies_available => {
                book.copies_available -= n;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Copies owned across all titles, on the shelf or on loan
    pub fn total_copies(&self) -> u64 {
        self.books.iter().map(Book::total_copies).sum()
    }
}

impl<'a> IntoIterator for &'a BookCatalog {
    type Item = &'a Book;
    type IntoIter = std::slice::Iter<'a, Book>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}

impl TryFrom<Vec<Book>> for BookCatalog {
    type Error = AppError;

    /// Builds a catalog from stored entries
    ///
    /// A store holding the same ISBN twice is folded into one entry, keeping
    /// both available and borrowed counts.
    fn try_from(books: Vec<Book>) -> Result<Self, Self::Error> {
        let mut catalog = Self::new();
        for book in books {
            match catalog.find_by_isbn_mut(&book.isbn) {
                Some(existing) => {
                    log::warn!("Duplicate catalog entry for ISBN {}, merging", book.isbn);
                    existing.copies_available = merged_count(
                        existing.copies_available,
                        book.copies_available,
                        "copiesAvailable",
                    )?;
                    existing.copies_borrowed = merged_count(
                        existing.copies_borrowed,
                        book.copies_borrowed,
                        "copiesBorrowed",
                    )?;
                }
                None => catalog.books.push(book),
            }
        }
        Ok(catalog)
    }
}

fn merged_count(current: u32, added: u32, field: &str) -> Result<u32, AppError> {
    current.checked_add(added).ok_or_else(|| {
        AppError::invalid_quantity(
            field,
            i64::from(current) + i64::from(added),
            format!("total copies cannot exceed {}", u32::MAX),
        )
    })
}

impl Serialize for BookCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.books.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BookCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let books = Vec::<Book>::deserialize(deserializer)?;
        Self::try_from(books).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;

    fn isbn(s: &str) -> Isbn {
        Isbn::parse(s).unwrap()
    }

    fn book(title: &str, author: &str, code: &str, copies: u32) -> Book {
        Book::new(title, author, isbn(code), copies)
    }

    #[test]
    fn test_add_new_book() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 2)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.total_copies(), 2);
    }

    #[test]
    fn test_add_same_isbn_merges_available_copies() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 2)).unwrap();
        let merged = catalog
            .add_or_merge(book("Dune (reprint)", "F. Herbert", "1111111111", 3))
            .unwrap();

        assert_eq!(merged.copies_available, 5);
        assert_eq!(merged.title, "Dune");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_find_by_isbn() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 1)).unwrap();

        assert!(catalog.find_by_isbn(&isbn("1111111111")).is_some());
        assert!(catalog.find_by_isbn(&isbn("2222222222")).is_none());
    }

    #[test]
    fn test_find_by_query_returns_first_match() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 1)).unwrap();
        catalog.add_or_merge(book("Dune Messiah", "Frank Herbert", "2222222222", 1)).unwrap();

        let found = catalog.find_by_query("dune").unwrap();
        assert_eq!(found.isbn, isbn("1111111111"));

        let by_author = catalog.find_by_query("HERBERT").unwrap();
        assert_eq!(by_author.isbn, isbn("1111111111"));

        assert!(catalog.find_by_query("Asimov").is_none());
    }

    #[test]
    fn test_remove() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 1)).unwrap();

        let removed = catalog.remove(&isbn("1111111111")).unwrap();
        assert_eq!(removed.title, "Dune");
        assert!(catalog.is_empty());
        assert!(catalog.remove(&isbn("1111111111")).is_none());
    }

    #[test]
    fn test_decrease_copies_boundaries() {
        let mut catalog = BookCatalog::new();
        let code = isbn("1111111111");
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 4)).unwrap();

        // n == copies_available is refused
        assert!(!catalog.decrease_copies(&code, 4));
        assert!(!catalog.decrease_copies(&code, 0));
        assert!(!catalog.decrease_copies(&code, 9));
        assert_eq!(catalog.find_by_isbn(&code).unwrap().copies_available, 4);

        // n == copies_available - 1 succeeds
        assert!(catalog.decrease_copies(&code, 3));
        assert_eq!(catalog.find_by_isbn(&code).unwrap().copies_available, 1);
    }

    #[test]
    fn test_decrease_unknown_isbn() {
        let mut catalog = BookCatalog::new();
        assert!(!catalog.decrease_copies(&isbn("1111111111"), 1));
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut catalog = BookCatalog::new();
        catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 1)).unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["title"], "Dune");

        let back: BookCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_duplicate_store_entries_are_folded() {
        let mut first = book("Dune", "Frank Herbert", "1111111111", 1);
        first.copies_borrowed = 2;
        let second = book("Dune", "Frank Herbert", "1111111111", 3);

        let catalog = BookCatalog::try_from(vec![first, second]).unwrap();
        let entry = catalog.find_by_isbn(&isbn("1111111111")).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(entry.copies_available, 4);
        assert_eq!(entry.copies_borrowed, 2);
    }

    #[test]
    fn test_merge_overflow_is_rejected() {
        let mut catalog = BookCatalog::new();
        let code = isbn("1111111111");
        catalog
            .add_or_merge(book("Dune", "Frank Herbert", "1111111111", u32::MAX - 1))
            .unwrap();

        let result = catalog.add_or_merge(book("Dune", "Frank Herbert", "1111111111", 2));
        assert!(matches!(
            result,
            Err(LibraryError::Domain(AppError::InvalidQuantity { .. }))
        ));
        assert_eq!(catalog.find_by_isbn(&code).unwrap().copies_available, u32::MAX - 1);
    }

    #[test]
    fn test_duplicate_store_entries_overflow_fails_load() {
        let first = book("Dune", "Frank Herbert", "1111111111", u32::MAX);
        let second = book("Dune", "Frank Herbert", "1111111111", 1);
        assert!(BookCatalog::try_from(vec![first.clone(), second.clone()]).is_err());

        let json = serde_json::to_string(&vec![first, second]).unwrap();
        assert!(serde_json::from_str::<BookCatalog>(&json).is_err());
    }
}
