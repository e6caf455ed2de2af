//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `bookstore_core` linkage and that the configured inventory opens.
//! - Keep output deterministic for quick local sanity checks.

use bookstore_core::{init_logging_from_config, BookFilter, BookStoreProvider, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("bookstore_core ping={}", bookstore_core::ping());
    println!("bookstore_core version={}", bookstore_core::core_version());

    let config = StoreConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let provider = match BookStoreProvider::open(&config.db_path, config.authority.as_str()) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    match provider.query(&provider.books_uri(), &BookFilter::all(), None) {
        Ok(books) => {
            println!("bookstore_core books={}", books.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to list books: {err}");
            ExitCode::FAILURE
        }
    }
}
