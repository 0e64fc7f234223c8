// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, bail, Context, Result};
use booklend_core::{is_isbn_valid, Book, BorrowId, Isbn};
use booklend_library::{
    AddOutcome, BorrowOutcome, LibraryError, LibraryResult, LibraryService, RemovalMode,
    SearchOutcome,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::ArgMatches;
use console::style;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Turns a library error into an anyhow error headed by its user-facing text
trait UserContext<T> {
    fn user_context(self) -> Result<T>;
}

impl<T> UserContext<T> for LibraryResult<T> {
    fn user_context(self) -> Result<T> {
        self.map_err(|e: LibraryError| {
            let message = format!("{}: {}", e.severity(), e.user_message());
            anyhow::Error::new(e).context(message)
        })
    }
}

/// Add copies of a book
pub fn add_book(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    let title = required(matches, "title")?;
    let author = required(matches, "author")?;
    let isbn = required(matches, "isbn")?;
    let copies = *matches
        .get_one::<u32>("copies")
        .ok_or_else(|| anyhow!("Number of copies is required"))?;

    match library.add_book(title, author, isbn, copies).user_context()? {
        AddOutcome::Added => {
            println!("{} Book added successfully!", style("✓").green().bold());
            println!("  Title: {}", title.trim());
            println!("  Author: {}", author.trim());
            println!("  ISBN: {}", isbn.trim());
            println!("  Copies: {}", copies);
        }
        AddOutcome::Merged { copies_available } => {
            println!(
                "{} A book with ISBN {} already exists. Available copies: {}",
                style("✓").green().bold(),
                isbn.trim(),
                style(copies_available).cyan()
            );
        }
    }
    Ok(())
}

/// List every book in the catalog
pub fn list_books(library: &LibraryService) -> Result<()> {
    let settings = library.settings();
    println!(
        "\n{} ({})",
        style(settings.library_name()).bold().cyan(),
        settings.library_location()
    );
    println!("{}", "=".repeat(80));

    if library.catalog().is_empty() {
        println!("No books in the library. Use the 'add' command to add some.");
        return Ok(());
    }

    for book in library.list_books() {
        print_book_summary(book);
    }
    println!(
        "\n{} titles, {} copies",
        library.catalog().len(),
        library.catalog().total_copies()
    );
    Ok(())
}

/// Show the first book matching the search text
pub fn search_books(library: &LibraryService, matches: &ArgMatches) -> Result<()> {
    let text = non_blank(required(matches, "text")?, "Search text")?;

    match library.search(text) {
        SearchOutcome::Found(book) => print_book_summary(book),
        SearchOutcome::NoMatch => println!("No book found matching '{}'", text),
    }
    Ok(())
}

/// Borrow one copy
pub fn borrow_book(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    let isbn = resolve_query(library, required(matches, "query")?)?;
    let date = match matches.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => Utc::now(),
    };

    match library.borrow(&isbn, date).user_context()? {
        BorrowOutcome::Borrowed(record) => {
            println!("{} Book borrowed successfully!", style("✓").green().bold());
            println!("  ISBN: {}", isbn);
            println!("  Borrow ID: {}", style(record.borrow_id).bold());
            println!("  Date: {}", record.borrowed_date.format(DATE_FORMAT));
        }
        BorrowOutcome::NotAvailable => {
            println!(
                "{} No copies of ISBN {} are available to borrow.",
                style("✗").yellow().bold(),
                isbn
            );
        }
    }
    Ok(())
}

/// Return a copy, or list the active loans for the book
pub fn return_book(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    let isbn = resolve_query(library, required(matches, "query")?)?;

    let Some(&raw_id) = matches.get_one::<u64>("borrow-id") else {
        return print_active_loans(library, &isbn);
    };

    let record = library
        .return_book(&isbn, BorrowId::new(raw_id))
        .user_context()?;
    println!("{} Book returned successfully!", style("✓").green().bold());
    println!("  ISBN: {}", isbn);
    println!("  Borrow ID: {}", record.borrow_id);
    println!("  Borrowed on: {}", record.borrowed_date.format(DATE_FORMAT));
    Ok(())
}

/// Remove a book entirely or decrease its copies
pub fn remove_book(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    let isbn = resolve_query(library, required(matches, "query")?)?;
    let mode = match matches.get_one::<u32>("copies") {
        Some(&n) => RemovalMode::DecreaseBy(n),
        None => RemovalMode::RemoveEntirely,
    };

    let changed = library.remove_or_decrease(&isbn, mode).user_context()?;
    match (mode, changed) {
        (RemovalMode::RemoveEntirely, _) => {
            println!("{} Book {} removed from the library.", style("✓").green().bold(), isbn);
        }
        (RemovalMode::DecreaseBy(n), true) => {
            println!("{} Removed {} copies of {}.", style("✓").green().bold(), n, isbn);
        }
        (RemovalMode::DecreaseBy(n), false) => {
            bail!(
                "Cannot remove {} copies of {}: the number must be positive and less than the available copies",
                n,
                isbn
            );
        }
    }
    Ok(())
}

/// List loans held longer than the maximum borrow days
pub fn list_overdue(library: &LibraryService) -> Result<()> {
    let max_days = library.settings().maximum_borrow_days();
    let mut overdue = library.list_overdue().peekable();

    if overdue.peek().is_none() {
        println!("No overdue books (maximum borrow days: {}).", max_days);
    } else {
        println!(
            "\n{} (maximum borrow days: {})",
            style("Overdue Books").bold().red(),
            max_days
        );
        println!("{}", "=".repeat(80));
        for entry in overdue {
            println!(
                "{} | Borrow ID: {} | Borrowed: {} | {} days",
                entry.book,
                entry.record.borrow_id,
                entry.record.borrowed_date.format(DATE_FORMAT),
                style(entry.whole_days()).red()
            );
        }
    }

    let orphans = library.orphaned_loans();
    if !orphans.is_empty() {
        println!(
            "\n{} Loans recorded for ISBNs no longer in the catalog:",
            style("!").yellow().bold()
        );
        for isbn in orphans {
            println!("  {}", isbn);
        }
    }
    Ok(())
}

/// Show settings, applying any given changes first
pub fn settings(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    let name = matches.get_one::<String>("name");
    let location = matches.get_one::<String>("location");
    let max_days = matches.get_one::<u32>("max-days").copied();

    if name.is_some() || location.is_some() || max_days.is_some() {
        library
            .update_settings(|settings| {
                if let Some(name) = name {
                    settings.set_library_name(name.trim());
                }
                if let Some(location) = location {
                    settings.set_library_location(location.trim());
                }
                match max_days {
                    Some(days) => settings.set_maximum_borrow_days(days),
                    None => Ok(()),
                }
            })
            .user_context()?;
        println!("{} Settings updated.", style("✓").green().bold());
    }

    let settings = library.settings();
    println!("\n{}", style("Library Settings").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Name: {}", settings.library_name());
    println!("Location: {}", settings.library_location());
    println!("Maximum borrow days: {}", settings.maximum_borrow_days());
    println!("Data directory: {}", library.gateway().data_dir().display());
    Ok(())
}

/// Resolves a query to an ISBN
///
/// A valid ISBN is taken as is; anything else picks the first title or
/// author match.
pub fn resolve_query(library: &LibraryService, query: &str) -> Result<Isbn> {
    let query = non_blank(query, "Book query")?;
    if is_isbn_valid(query) {
        return Isbn::parse(query).with_context(|| format!("Invalid ISBN '{}'", query));
    }

    match library.search(query) {
        SearchOutcome::Found(book) => Ok(book.isbn.clone()),
        SearchOutcome::NoMatch => bail!("No book found matching '{}'", query),
    }
}

/// Parses a `dd/mm/yyyy` date as midnight UTC
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected DD/MM/YYYY", raw))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date '{}'", raw))?;
    Ok(midnight.and_utc())
}

fn print_active_loans(library: &LibraryService, isbn: &Isbn) -> Result<()> {
    let records = library.ledger().records(isbn);
    if records.is_empty() {
        println!("No borrowed copies of {}.", isbn);
        return Ok(());
    }

    println!("\n{} Active loans for {}", style(records.len()).bold().cyan(), isbn);
    for record in records {
        println!(
            "  Borrow ID: {} | Borrowed: {}",
            record.borrow_id,
            record.borrowed_date.format(DATE_FORMAT)
        );
    }
    Ok(())
}

fn print_book_summary(book: &Book) {
    println!(
        "\n{} by {}",
        style(&book.title).bold(),
        style(&book.author).italic()
    );
    println!("  ISBN: {}", book.isbn);
    println!(
        "  Copies: {} available, {} borrowed",
        style(book.copies_available).green(),
        book.copies_borrowed
    );
}

fn non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", what);
    }
    Ok(trimmed)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Argument '{}' is required", name))
}
