//! Active loans, grouped by ISBN
//!
//! The ledger owns every `BorrowRecord` and hands out borrow ids. It refers
//! to books only by ISBN; copy counts live on the catalog's `Book`, which is
//! passed in by the caller for the operations that change them.

use crate::catalog::BookCatalog;
use crate::error::LibraryResult;
use booklend_core::error::AppError;
use booklend_core::{Book, BorrowId, BorrowRecord, Isbn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};

/// Result of a borrow attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// A copy was lent out under this record
    Borrowed(BorrowRecord),
    /// No copy on the shelf; nothing changed
    NotAvailable,
}

impl BorrowOutcome {
    pub fn record(&self) -> Option<&BorrowRecord> {
        match self {
            Self::Borrowed(record) => Some(record),
            Self::NotAvailable => None,
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed(_))
    }
}

/// Per-ISBN borrow records plus the id allocator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowingLedger {
    entries: BTreeMap<Isbn, Vec<BorrowRecord>>,
    next_id: BorrowId,
}

impl BorrowingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored records
    ///
    /// The id allocator resumes after the highest stored id so ids stay
    /// unique across restarts.
    pub fn from_entries(entries: BTreeMap<Isbn, Vec<BorrowRecord>>) -> Self {
        let mut seen = HashSet::new();
        for record in entries.values().flatten() {
            if !seen.insert(record.borrow_id) {
                log::warn!(
                    "Borrow id {} appears more than once in the ledger",
                    record.borrow_id
                );
            }
        }

        let next_id = entries
            .values()
            .flatten()
            .map(|r| r.borrow_id)
            .max()
            .map(|max| max.next())
            .unwrap_or_default();

        let entries = entries
            .into_iter()
            .filter(|(_, records)| !records.is_empty())
            .collect();

        Self { entries, next_id }
    }

    /// Lends one copy of `book`
    ///
    /// With no copy on the shelf this returns `NotAvailable` and changes
    /// neither the book nor the ledger.
    pub fn borrow(&mut self, book: &mut Book, date: DateTime<Utc>) -> BorrowOutcome {
        if book.copies_available == 0 {
            return BorrowOutcome::NotAvailable;
        }

        book.copies_available -= 1;
        book.copies_borrowed = book.copies_borrowed.saturating_add(1);

        let record = BorrowRecord::new(self.allocate_id(), date);
        self.entries
            .entry(book.isbn.clone())
            .or_default()
            .push(record.clone());

        log::debug!("Lent ISBN {} as borrow {}", book.isbn, record.borrow_id);
        BorrowOutcome::Borrowed(record)
    }

    /// Takes back the copy lent under `borrow_id`
    pub fn return_copy(
        &mut self,
        book: &mut Book,
        borrow_id: BorrowId,
    ) -> LibraryResult<BorrowRecord> {
        let records = self
            .entries
            .get_mut(&book.isbn)
            .ok_or_else(|| AppError::NoActiveBorrows {
                isbn: book.isbn.to_string(),
            })?;

        let index = records
            .iter()
            .position(|r| r.borrow_id == borrow_id)
            .ok_or_else(|| AppError::BorrowNotFound {
                isbn: book.isbn.to_string(),
                borrow_id: borrow_id.value(),
            })?;

        let record = records.remove(index);
        if records.is_empty() {
            self.entries.remove(&book.isbn);
        }

        book.copies_available = book.copies_available.saturating_add(1);
        book.copies_borrowed = book.copies_borrowed.saturating_sub(1);

        log::debug!("Returned borrow {} of ISBN {}", borrow_id, book.isbn);
        Ok(record)
    }

    /// Active records for an ISBN, oldest first
    pub fn records(&self, isbn: &Isbn) -> &[BorrowRecord] {
        self.entries.get(isbn).map(Vec::as_slice).unwrap_or_default()
    }

    /// Most recently borrowed active record for an ISBN
    pub fn last_borrowed(&self, isbn: &Isbn) -> Option<&BorrowRecord> {
        self.records(isbn).last()
    }

    /// Number of copies on loan across all ISBNs
    pub fn active_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// The id the next borrow will receive
    pub fn next_borrow_id(&self) -> BorrowId {
        self.next_id
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Isbn, Vec<BorrowRecord>> {
        self.entries.iter()
    }

    /// Loans held longer than `max_days` as of `now`
    ///
    /// The iterator borrows the ledger and catalog and computes lazily;
    /// call again (or clone it) to start over.
    pub fn overdue<'a>(
        &'a self,
        catalog: &'a BookCatalog,
        now: DateTime<Utc>,
        max_days: u32,
    ) -> Overdue<'a> {
        Overdue {
            catalog,
            entries: self.entries.iter(),
            current: None,
            now,
            max_days,
        }
    }

    /// ISBNs with active loans but no catalog entry
    pub fn orphaned_isbns<'a>(
        &'a self,
        catalog: &'a BookCatalog,
    ) -> impl Iterator<Item = &'a Isbn> + 'a {
        self.entries
            .keys()
            .filter(move |isbn| catalog.find_by_isbn(isbn).is_none())
    }

    fn allocate_id(&mut self) -> BorrowId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }
}

impl Serialize for BorrowingLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BorrowingLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<Isbn, Vec<BorrowRecord>>::deserialize(deserializer).map(Self::from_entries)
    }
}

/// One overdue loan
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueEntry<'a> {
    pub book: &'a Book,
    pub record: &'a BorrowRecord,
    pub days_elapsed: f64,
}

impl OverdueEntry<'_> {
    /// Elapsed days rounded to the nearest whole day
    pub fn whole_days(&self) -> i64 {
        self.days_elapsed.round() as i64
    }
}

/// Lazy iterator over overdue loans, in ISBN order then borrow order
#[derive(Debug, Clone)]
pub struct Overdue<'a> {
    catalog: &'a BookCatalog,
    entries: btree_map::Iter<'a, Isbn, Vec<BorrowRecord>>,
    current: Option<(&'a Book, std::slice::Iter<'a, BorrowRecord>)>,
    now: DateTime<Utc>,
    max_days: u32,
}

impl<'a> Iterator for Overdue<'a> {
    type Item = OverdueEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((book, records)) = self.current.as_mut() {
                for record in records.by_ref() {
                    if record.is_overdue(self.now, self.max_days) {
                        return Some(OverdueEntry {
                            book: *book,
                            record,
                            days_elapsed: record.days_elapsed(self.now),
                        });
                    }
                }
            }

            let (isbn, records) = self.entries.next()?;
            match self.catalog.find_by_isbn(isbn) {
                Some(book) => self.current = Some((book, records.iter())),
                None => {
                    log::warn!("Book with ISBN {} not found in the library", isbn);
                    self.current = None;
                }
            }
        }
    }
}
