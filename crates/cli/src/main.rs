// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use booklend_config::ConfigManager;
use booklend_library::LibraryService;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

mod commands;

fn query_arg() -> Arg {
    Arg::new("query")
        .required(true)
        .value_name("ISBN_OR_TEXT")
        .help("ISBN, or text matching a title or author (first match wins)")
}

fn build_cli() -> Command {
    Command::new("booklend")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Booklend Team")
        .about("Book inventory, lending and overdue tracking for a small library")
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the library stores")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log informational messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("add")
                .about("Add copies of a book to the library")
                .arg(Arg::new("title").required(true).value_name("TITLE").help("Book title"))
                .arg(Arg::new("author").required(true).value_name("AUTHOR").help("Book author"))
                .arg(Arg::new("isbn").required(true).value_name("ISBN").help("10 or 13 digit ISBN"))
                .arg(
                    Arg::new("copies")
                        .required(true)
                        .value_name("COPIES")
                        .help("Number of copies to add")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(Command::new("list").about("List all books in the library"))
        .subcommand(
            Command::new("search")
                .about("Find the first book whose title or author contains the text")
                .arg(Arg::new("text").required(true).value_name("TEXT").help("Search text")),
        )
        .subcommand(
            Command::new("borrow")
                .about("Borrow one copy of a book")
                .arg(query_arg())
                .arg(
                    Arg::new("date")
                        .long("date")
                        .value_name("DD/MM/YYYY")
                        .help("Borrow date (defaults to now)"),
                ),
        )
        .subcommand(
            Command::new("return")
                .about("Return a borrowed copy, or list active borrow ids when none is given")
                .arg(query_arg())
                .arg(
                    Arg::new("borrow-id")
                        .value_name("BORROW_ID")
                        .help("Id issued when the copy was borrowed")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a book, or take copies off the shelf")
                .arg(query_arg())
                .arg(
                    Arg::new("copies")
                        .short('c')
                        .long("copies")
                        .value_name("N")
                        .help("Remove N copies instead of the whole entry")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(Command::new("overdue").about("List loans past the maximum borrow days"))
        .subcommand(
            Command::new("settings")
                .about("Show or change library settings")
                .arg(Arg::new("name").long("name").value_name("NAME").help("Library name"))
                .arg(
                    Arg::new("location")
                        .long("location")
                        .value_name("LOCATION")
                        .help("Library location"),
                )
                .arg(
                    Arg::new("max-days")
                        .long("max-days")
                        .value_name("DAYS")
                        .help("Maximum borrow days")
                        .value_parser(value_parser!(u32)),
                ),
        )
}

fn open_library(matches: &ArgMatches) -> Result<LibraryService> {
    let manager = match matches.get_one::<PathBuf>("data-dir") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to resolve the library data directory")?;

    log::info!("Using data directory {}", manager.data_dir().display());
    Ok(LibraryService::open_in(&manager))
}

fn run(library: &mut LibraryService, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("add", sub_matches)) => commands::add_book(library, sub_matches),
        Some(("list", _)) => commands::list_books(library),
        Some(("search", sub_matches)) => commands::search_books(library, sub_matches),
        Some(("borrow", sub_matches)) => commands::borrow_book(library, sub_matches),
        Some(("return", sub_matches)) => commands::return_book(library, sub_matches),
        Some(("remove", sub_matches)) => commands::remove_book(library, sub_matches),
        Some(("overdue", _)) => commands::list_overdue(library),
        Some(("settings", sub_matches)) => commands::settings(library, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let default_filter = if matches.get_flag("verbose") { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut library = open_library(&matches)?;
    run(&mut library, &matches)
}
