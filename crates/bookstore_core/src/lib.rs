//! Core inventory logic for the bookstore app.
//! This crate is the single source of truth for book field invariants.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod provider;
pub mod repo;

pub use config::StoreConfig;
pub use editor::controller::{
    CloseReason, DeleteChoice, DeleteOutcome, DialTarget, EditorController, EditorError,
    EditorMode, EditorResult, ExitKind, ExitOutcome, LoadOutcome, Prompt, SaveOutcome,
    UnsavedChoice,
};
pub use editor::form::{BookForm, FormField};
pub use editor::notice::Notice;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogLevel,
    LoggingError,
};
pub use model::book::{Book, BookId, BookValidationError, BookValues, NewBook};
pub use provider::book_provider::{
    BookStoreProvider, FetchError, ProviderError, ProviderOperation, ProviderResult,
};
pub use provider::notify::{ChangeEvent, ChangeNotifier, ChangeSubscription};
pub use provider::uri::{match_uri, ContentUri, UriMatch, UriParseError, DEFAULT_AUTHORITY};
pub use repo::book_repo::{
    BookColumn, BookFilter, BookPredicate, BookRepository, BookSort, RepoError, RepoResult,
    SortDirection, SqliteBookRepository,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
