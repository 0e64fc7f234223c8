//! High-level library orchestration
//!
//! `LibraryService` validates requests, applies them to the catalog and the
//! ledger, and writes all three stores back after every change.

use crate::catalog::BookCatalog;
use crate::error::{LibraryError, LibraryResult};
use crate::ledger::{BorrowOutcome, BorrowingLedger, Overdue};
use booklend_config::{ConfigManager, ConfigResult, LibrarySettings};
use booklend_core::error::AppError;
use booklend_core::{Book, BorrowId, BorrowRecord, Isbn, Validator};
use booklend_store::{PersistenceGateway, StoreName};
use chrono::{DateTime, Utc};
use log::{info, warn};

/// When changes reach the stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// Save every store after each mutating call
    #[default]
    WriteThrough,
    /// Only save on `flush`
    Deferred,
}

/// How `remove_or_decrease` treats a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    /// Delete the catalog entry
    RemoveEntirely,
    /// Take this many copies off the shelf
    DecreaseBy(u32),
}

/// Result of adding a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New catalog entry
    Added,
    /// Copies merged into an existing entry with the same ISBN
    Merged { copies_available: u32 },
}

/// Result of a free-text search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    Found(&'a Book),
    NoMatch,
}

impl<'a> SearchOutcome<'a> {
    pub fn book(self) -> Option<&'a Book> {
        match self {
            Self::Found(book) => Some(book),
            Self::NoMatch => None,
        }
    }
}

/// High-level library management
pub struct LibraryService {
    settings: LibrarySettings,
    catalog: BookCatalog,
    ledger: BorrowingLedger,
    gateway: PersistenceGateway,
    persist_mode: PersistMode,
    dirty: bool,
}

impl LibraryService {
    /// Restores the library from the gateway's stores
    ///
    /// Missing or unreadable stores fall back to empty/default aggregates.
    pub fn open(gateway: PersistenceGateway) -> Self {
        info!(
            "Opening library data in {}",
            gateway.data_dir().display()
        );

        let settings = gateway.load(StoreName::Settings).unwrap_or_default();
        let catalog = gateway.load(StoreName::Catalog).unwrap_or_default();
        let ledger = gateway.load(StoreName::Ledger).unwrap_or_default();

        let service = Self {
            settings,
            catalog,
            ledger,
            gateway,
            persist_mode: PersistMode::default(),
            dirty: false,
        };
        service.check_integrity();
        service
    }

    /// Opens the library stored in the manager's data directory
    pub fn open_in(manager: &ConfigManager) -> Self {
        Self::open(PersistenceGateway::new(manager.data_dir()))
    }

    pub fn with_persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }

    /// Adds copies of a book, merging into an existing entry by ISBN
    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        copies: u32,
    ) -> LibraryResult<AddOutcome> {
        let isbn = Isbn::parse(isbn).map_err(|e| AppError::invalid_isbn(isbn, e))?;
        if copies == 0 {
            return Err(AppError::invalid_quantity(
                "copies",
                0,
                "must be greater than zero",
            )
            .into());
        }

        let book = Book::new(title.trim(), author.trim(), isbn, copies);
        book.validate().map_err(|errors| AppError::InvalidBook {
            reason: errors.join(", "),
        })?;

        let existed = self.catalog.find_by_isbn(&book.isbn).is_some();
        let entry = self.catalog.add_or_merge(book)?;
        let outcome = if existed {
            info!(
                "ISBN {} already exists, available copies now {}",
                entry.isbn, entry.copies_available
            );
            AddOutcome::Merged {
                copies_available: entry.copies_available,
            }
        } else {
            info!("Added '{}' by '{}' ({})", entry.title, entry.author, entry.isbn);
            AddOutcome::Added
        };

        self.persist();
        Ok(outcome)
    }

    /// Removes a book entirely or takes copies off the shelf
    ///
    /// Returns false when a decrease is refused (see
    /// [`BookCatalog::decrease_copies`]).
    pub fn remove_or_decrease(&mut self, isbn: &Isbn, mode: RemovalMode) -> LibraryResult<bool> {
        self.require_book(isbn)?;

        let changed = match mode {
            RemovalMode::RemoveEntirely => {
                if let Some(book) = self.catalog.remove(isbn) {
                    info!("Book '{}' by '{}' removed from the library", book.title, book.author);
                    if book.copies_borrowed > 0 {
                        warn!(
                            "Removed ISBN {} with {} copies still on loan",
                            isbn, book.copies_borrowed
                        );
                    }
                }
                true
            }
            RemovalMode::DecreaseBy(n) => self.catalog.decrease_copies(isbn, n),
        };

        self.persist();
        Ok(changed)
    }

    /// First book whose title or author contains `text`
    pub fn search(&self, text: &str) -> SearchOutcome<'_> {
        match self.catalog.find_by_query(text) {
            Some(book) => SearchOutcome::Found(book),
            None => SearchOutcome::NoMatch,
        }
    }

    pub fn find_by_isbn(&self, isbn: &Isbn) -> Option<&Book> {
        self.catalog.find_by_isbn(isbn)
    }

    /// Lends one copy of the book on `date`
    pub fn borrow(&mut self, isbn: &Isbn, date: DateTime<Utc>) -> LibraryResult<BorrowOutcome> {
        let book = self
            .catalog
            .find_by_isbn_mut(isbn)
            .ok_or_else(|| AppError::BookNotFound {
                isbn: isbn.to_string(),
            })?;

        let outcome = self.ledger.borrow(book, date);
        if outcome.is_borrowed() {
            self.persist();
        } else {
            info!("No copies of ISBN {} available to borrow", isbn);
        }
        Ok(outcome)
    }

    /// Takes back the copy lent under `borrow_id`
    pub fn return_book(&mut self, isbn: &Isbn, borrow_id: BorrowId) -> LibraryResult<BorrowRecord> {
        let book = self
            .catalog
            .find_by_isbn_mut(isbn)
            .ok_or_else(|| AppError::BookNotFound {
                isbn: isbn.to_string(),
            })?;

        let record = self.ledger.return_copy(book, borrow_id)?;
        self.persist();
        Ok(record)
    }

    /// Loans held longer than the configured maximum, as of now
    pub fn list_overdue(&self) -> Overdue<'_> {
        self.list_overdue_at(Utc::now())
    }

    /// Loans held longer than the configured maximum, as of `now`
    pub fn list_overdue_at(&self, now: DateTime<Utc>) -> Overdue<'_> {
        self.ledger
            .overdue(&self.catalog, now, self.settings.maximum_borrow_days())
    }

    /// ISBNs with active loans but no catalog entry
    pub fn orphaned_loans(&self) -> Vec<&Isbn> {
        self.ledger.orphaned_isbns(&self.catalog).collect()
    }

    pub fn list_books(&self) -> std::slice::Iter<'_, Book> {
        self.catalog.iter()
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Changes settings; nothing changes if `update` fails
    pub fn update_settings<F>(&mut self, update: F) -> LibraryResult<()>
    where
        F: FnOnce(&mut LibrarySettings) -> ConfigResult<()>,
    {
        let mut updated = self.settings.clone();
        update(&mut updated)?;
        self.settings = updated;
        self.persist();
        Ok(())
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &BorrowingLedger {
        &self.ledger
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// True if deferred changes have not been flushed yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes all three stores now, reporting the first failure
    ///
    /// Every store is attempted even if an earlier one fails.
    pub fn flush(&mut self) -> LibraryResult<()> {
        let mut first_error: Option<LibraryError> = None;
        for store in StoreName::ALL {
            let result = match store {
                StoreName::Settings => self.gateway.try_save(store, &self.settings),
                StoreName::Catalog => self.gateway.try_save(store, &self.catalog),
                StoreName::Ledger => self.gateway.try_save(store, &self.ledger),
            };
            if let Err(e) = result {
                warn!("Error saving {} store: {}", store, e);
                first_error.get_or_insert_with(|| {
                    AppError::PersistenceFailed {
                        store: store.to_string(),
                        reason: e.to_string(),
                    }
                    .into()
                });
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                self.dirty = false;
                Ok(())
            }
        }
    }

    fn persist(&mut self) {
        match self.persist_mode {
            PersistMode::WriteThrough => {
                // Failures are logged; in-memory state stays authoritative
                if self.flush().is_err() {
                    self.dirty = true;
                }
            }
            PersistMode::Deferred => self.dirty = true,
        }
    }

    fn require_book(&self, isbn: &Isbn) -> LibraryResult<&Book> {
        self.catalog.find_by_isbn(isbn).ok_or_else(|| {
            AppError::BookNotFound {
                isbn: isbn.to_string(),
            }
            .into()
        })
    }

    fn check_integrity(&self) {
        for isbn in self.ledger.orphaned_isbns(&self.catalog) {
            warn!("Borrowed records reference ISBN {} which is not in the catalog", isbn);
        }
        for book in self.catalog.iter() {
            let on_loan = self.ledger.records(&book.isbn).len();
            if on_loan != book.copies_borrowed as usize {
                warn!(
                    "ISBN {} records {} borrowed copies but the ledger holds {}",
                    book.isbn, book.copies_borrowed, on_loan
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::ErrorSeverity;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn setup_test_service() -> (TempDir, LibraryService) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = LibraryService::open(PersistenceGateway::new(temp_dir.path()));
        (temp_dir, service)
    }

    fn isbn(s: &str) -> Isbn {
        Isbn::parse(s).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_open_empty_uses_defaults() {
        let (_temp, service) = setup_test_service();
        assert_eq!(service.settings(), &LibrarySettings::default());
        assert_eq!(service.list_books().count(), 0);
        assert_eq!(service.ledger().active_count(), 0);
    }

    #[test]
    fn test_add_book_rejects_bad_isbn() {
        let (_temp, mut service) = setup_test_service();
        let result = service.add_book("Dune", "Frank Herbert", "123", 1);

        let err = result.unwrap_err();
        assert_eq!(err.severity(), ErrorSeverity::Rejected);
        assert!(service.catalog().is_empty());
    }

    #[test]
    fn test_add_book_rejects_zero_copies() {
        let (_temp, mut service) = setup_test_service();
        let result = service.add_book("Dune", "Frank Herbert", "1111111111", 0);
        assert!(matches!(
            result,
            Err(LibraryError::Domain(AppError::InvalidQuantity { .. }))
        ));
        assert!(service.catalog().is_empty());
    }

    #[test]
    fn test_add_book_rejects_blank_title() {
        let (_temp, mut service) = setup_test_service();
        let result = service.add_book("  ", "Frank Herbert", "1111111111", 1);
        assert!(matches!(
            result,
            Err(LibraryError::Domain(AppError::InvalidBook { .. }))
        ));
    }

    #[test]
    fn test_add_book_merges() {
        let (_temp, mut service) = setup_test_service();
        assert_eq!(
            service.add_book("Dune", "Frank Herbert", "1111111111", 2).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            service.add_book("Dune", "Frank Herbert", "1111111111", 3).unwrap(),
            AddOutcome::Merged { copies_available: 5 }
        );
    }

    #[test]
    fn test_add_book_writes_all_stores() {
        let (_temp, mut service) = setup_test_service();
        service.add_book("Dune", "Frank Herbert", "1111111111", 2).unwrap();

        for store in StoreName::ALL {
            assert!(service.gateway().store_path(store).exists());
        }
    }

    #[test]
    fn test_borrow_unknown_book() {
        let (_temp, mut service) = setup_test_service();
        let result = service.borrow(&isbn("1111111111"), day(0));
        assert!(matches!(
            result,
            Err(LibraryError::Domain(AppError::BookNotFound { .. }))
        ));
    }

    #[test]
    fn test_remove_or_decrease() {
        let (_temp, mut service) = setup_test_service();
        let code = isbn("1111111111");
        service.add_book("Dune", "Frank Herbert", "1111111111", 3).unwrap();

        assert!(!service.remove_or_decrease(&code, RemovalMode::DecreaseBy(3)).unwrap());
        assert!(service.remove_or_decrease(&code, RemovalMode::DecreaseBy(2)).unwrap());
        assert_eq!(service.find_by_isbn(&code).unwrap().copies_available, 1);

        assert!(service.remove_or_decrease(&code, RemovalMode::RemoveEntirely).unwrap());
        assert!(service.find_by_isbn(&code).is_none());

        let missing = service.remove_or_decrease(&code, RemovalMode::RemoveEntirely);
        assert!(missing.unwrap_err().severity() == ErrorSeverity::NotFound);
    }

    #[test]
    fn test_search_outcomes() {
        let (_temp, mut service) = setup_test_service();
        service.add_book("Dune", "Frank Herbert", "1111111111", 1).unwrap();

        assert!(matches!(service.search("herbert"), SearchOutcome::Found(_)));
        assert_eq!(service.search("Tolstoy"), SearchOutcome::NoMatch);
        assert!(service.search("Tolstoy").book().is_none());
    }

    #[test]
    fn test_update_settings() {
        let (_temp, mut service) = setup_test_service();

        service
            .update_settings(|s| s.set_maximum_borrow_days(14))
            .unwrap();
        assert_eq!(service.settings().maximum_borrow_days(), 14);

        let result = service.update_settings(|s| {
            s.set_library_name("Should not stick");
            s.set_maximum_borrow_days(0)
        });
        assert!(matches!(result, Err(LibraryError::Config(_))));
        assert_eq!(service.settings().maximum_borrow_days(), 14);
        assert_eq!(service.settings().library_name(), "Atatürk Kültür Merkezi");
    }

    #[test]
    fn test_deferred_mode_waits_for_flush() {
        let (_temp, service) = setup_test_service();
        let mut service = service.with_persist_mode(PersistMode::Deferred);

        service.add_book("Dune", "Frank Herbert", "1111111111", 1).unwrap();
        assert!(service.is_dirty());
        assert!(!service.gateway().store_path(StoreName::Catalog).exists());

        service.flush().unwrap();
        assert!(!service.is_dirty());
        assert!(service.gateway().store_path(StoreName::Catalog).exists());
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut service = LibraryService::open(PersistenceGateway::new(&blocker));
        // Write-through failures are swallowed
        service.add_book("Dune", "Frank Herbert", "1111111111", 1).unwrap();
        assert_eq!(service.catalog().len(), 1);
        assert!(service.is_dirty());

        let err = service.flush().unwrap_err();
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(service.is_dirty());
    }

    #[test]
    fn test_write_through_failure_clears_after_successful_flush() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        std::fs::write(&data_dir, "not a directory").unwrap();

        let mut service = LibraryService::open(PersistenceGateway::new(&data_dir));
        service.add_book("Dune", "Frank Herbert", "1111111111", 1).unwrap();
        assert!(service.is_dirty());

        std::fs::remove_file(&data_dir).unwrap();
        service.flush().unwrap();
        assert!(!service.is_dirty());
        assert!(service.gateway().store_path(StoreName::Catalog).exists());
    }

    #[test]
    fn test_add_book_rejects_copy_overflow() {
        let (_temp, mut service) = setup_test_service();
        let code = isbn("1111111111");
        service
            .add_book("Dune", "Frank Herbert", "1111111111", u32::MAX)
            .unwrap();

        let result = service.add_book("Dune", "Frank Herbert", "1111111111", 1);
        assert!(matches!(
            result,
            Err(LibraryError::Domain(AppError::InvalidQuantity { .. }))
        ));
        assert_eq!(service.find_by_isbn(&code).unwrap().copies_available, u32::MAX);
    }
}
