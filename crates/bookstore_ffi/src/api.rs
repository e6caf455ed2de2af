//! Inventory calls exported to the Flutter shell.
//!
//! # Responsibility
//! - Expose inventory CRUD and logging setup to Dart via FRB.
//! - Flatten provider results into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - URIs cross the boundary as `content://` strings.

use bookstore_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Book, BookFilter, BookStoreProvider, BookValues, ContentUri, Notice, ProviderError,
    StoreConfig,
};
use log::warn;
use std::sync::{Arc, OnceLock};

static PROVIDER: OnceLock<Arc<BookStoreProvider>> = OnceLock::new();

/// Liveness probe for the Dart side.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Version of the linked `bookstore_core`.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Repeating the same call is a no-op; changing level or directory fails.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One book row for list/detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub id: i64,
    /// Single-item `content://` URI for follow-up calls.
    pub uri: String,
    pub title: String,
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: String,
    pub supplier_phone: String,
}

/// Response envelope for insert/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookActionResponse {
    pub ok: bool,
    /// Item URI of the inserted or addressed record.
    pub uri: Option<String>,
    /// Rows touched by the write.
    pub rows: u64,
    /// Short user-facing message.
    pub message: String,
}

impl BookActionResponse {
    fn success(notice: Notice, uri: Option<String>, rows: u64) -> Self {
        Self {
            ok: true,
            uri,
            rows,
            message: notice.message(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            uri: None,
            rows: 0,
            message: message.into(),
        }
    }
}

/// Response envelope for reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQueryResponse {
    pub items: Vec<BookItem>,
    pub message: String,
}

/// Inserts a complete book record.
///
/// # FFI contract
/// - Runs synchronously against the configured inventory file.
/// - Validation failures return `ok=false` with the offending field message.
#[flutter_rust_bridge::frb(sync)]
pub fn book_insert(
    title: String,
    price: i64,
    quantity: i64,
    supplier_name: String,
    supplier_phone: String,
) -> BookActionResponse {
    let values = BookValues::complete(title, price, quantity, supplier_name, supplier_phone);
    let result = with_provider(|provider| {
        provider
            .insert(&provider.books_uri(), &values)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(Some(uri)) => BookActionResponse::success(Notice::InsertSucceeded, Some(uri.to_string()), 1),
        Ok(None) => BookActionResponse::failure(Notice::InsertFailed.message()),
        Err(message) => BookActionResponse::failure(message),
    }
}

/// Writes the provided fields to the record(s) addressed by `uri`.
///
/// `None` fields are left unchanged; all `None` is a no-op returning
/// `ok=false, rows=0`.
#[flutter_rust_bridge::frb(sync)]
pub fn book_update(
    uri: String,
    title: Option<String>,
    price: Option<i64>,
    quantity: Option<i64>,
    supplier_name: Option<String>,
    supplier_phone: Option<String>,
) -> BookActionResponse {
    let values = BookValues {
        title,
        price,
        quantity,
        supplier_name,
        supplier_phone,
    };
    let result = parse_uri(&uri).and_then(|target| {
        with_provider(|provider| {
            provider
                .update(&target, &values, &BookFilter::all())
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(0) => BookActionResponse::failure(Notice::UpdateFailed.message()),
        Ok(rows) => BookActionResponse::success(Notice::UpdateSucceeded, Some(uri), rows as u64),
        Err(message) => BookActionResponse::failure(message),
    }
}

/// Deletes the record(s) addressed by `uri`.
#[flutter_rust_bridge::frb(sync)]
pub fn book_delete(uri: String) -> BookActionResponse {
    let result = parse_uri(&uri).and_then(|target| {
        with_provider(|provider| {
            provider
                .delete(&target, &BookFilter::all())
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(0) => BookActionResponse::failure(Notice::DeleteFailed.message()),
        Ok(rows) => BookActionResponse::success(Notice::DeleteSucceeded, Some(uri), rows as u64),
        Err(message) => BookActionResponse::failure(message),
    }
}

/// Reads the record(s) addressed by `uri`.
#[flutter_rust_bridge::frb(sync)]
pub fn book_get(uri: String) -> BookQueryResponse {
    query_response(parse_uri(&uri))
}

/// Lists every book ordered by id.
#[flutter_rust_bridge::frb(sync)]
pub fn book_list() -> BookQueryResponse {
    query_response(with_provider(|provider| Ok(provider.books_uri())))
}

/// MIME type of the resource behind `uri`, or `None` when unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn book_mime_type(uri: String) -> Option<String> {
    let target = parse_uri(&uri).ok()?;
    with_provider(|provider| {
        provider.get_type(&target).map_err(|err: ProviderError| err.to_string())
    })
    .ok()
}

fn query_response(target: Result<ContentUri, String>) -> BookQueryResponse {
    let result = target.and_then(|target| {
        with_provider(|provider| {
            provider
                .query(&target, &BookFilter::all(), None)
                .map(|books| {
                    books
                        .iter()
                        .map(|book| to_book_item(provider, book))
                        .collect::<Vec<_>>()
                })
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No books.".to_string()
            } else {
                format!("Found {} book(s).", items.len())
            };
            BookQueryResponse { items, message }
        }
        Err(message) => BookQueryResponse {
            items: Vec::new(),
            message,
        },
    }
}

fn parse_uri(raw: &str) -> Result<ContentUri, String> {
    raw.parse::<ContentUri>().map_err(|err| err.to_string())
}

fn with_provider<T>(
    f: impl FnOnce(&BookStoreProvider) -> Result<T, String>,
) -> Result<T, String> {
    if let Some(provider) = PROVIDER.get() {
        return f(provider);
    }

    let config = StoreConfig::from_env();
    let provider = BookStoreProvider::open(&config.db_path, config.authority.as_str())
        .map_err(|err| format!("inventory DB open failed: {err}"))?;
    if PROVIDER.set(Arc::new(provider)).is_err() {
        warn!("event=ffi_provider_init module=ffi status=race");
    }
    match PROVIDER.get() {
        Some(provider) => f(provider),
        None => Err("inventory provider is unavailable".to_string()),
    }
}

fn to_book_item(provider: &BookStoreProvider, book: &Book) -> BookItem {
    BookItem {
        id: book.id,
        uri: provider.book_uri(book.id).to_string(),
        title: book.title.clone(),
        price: book.price,
        quantity: book.quantity,
        supplier_name: book.supplier_name.clone(),
        supplier_phone: book.supplier_phone.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        book_delete, book_get, book_insert, book_list, book_mime_type, book_update, core_version,
        init_logging, ping,
    };
    use bookstore_core::config::ENV_DB_PATH;
    use bookstore_core::db::open_db;
    use bookstore_core::StoreConfig;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    static TEST_STORE: OnceLock<TempDir> = OnceLock::new();

    /// Points the shared provider at a per-run temp database before its
    /// first use.
    fn use_temp_store() {
        TEST_STORE.get_or_init(|| {
            let dir = tempfile::tempdir().expect("temp dir");
            std::env::set_var(ENV_DB_PATH, dir.path().join("bookstore.sqlite3"));
            dir
        });
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn insert_then_get_returns_the_same_fields() {
        use_temp_store();
        let title = unique_token("ffi-insert");
        let created = book_insert(title.clone(), 12, 2, "Ace".to_string(), "555".to_string());
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.message, "Book saved");
        let uri = created.uri.expect("insert should return uri");

        let fetched = book_get(uri.clone());
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].title, title);
        assert_eq!(fetched.items[0].uri, uri);
        assert!(book_list().items.iter().any(|item| item.uri == uri));

        let db_path = StoreConfig::from_env().db_path;
        let store_dir = TEST_STORE.get().expect("temp store initialized");
        assert!(db_path.starts_with(store_dir.path()));
        let conn = open_db(db_path).expect("open db");
        let price: i64 = conn
            .query_row(
                "SELECT price FROM books WHERE title = ?1",
                [title.as_str()],
                |row| row.get(0),
            )
            .expect("query inserted row");
        assert_eq!(price, 12);
    }

    #[test]
    fn insert_rejects_invalid_price() {
        use_temp_store();
        let response = book_insert(
            unique_token("ffi-bad"),
            -1,
            1,
            "Ace".to_string(),
            "555".to_string(),
        );
        assert!(!response.ok);
        assert_eq!(response.message, "Book requires valid price");
    }

    #[test]
    fn update_and_delete_report_rows() {
        use_temp_store();
        let created = book_insert(
            unique_token("ffi-update"),
            5,
            1,
            "Ace".to_string(),
            "555".to_string(),
        );
        let uri = created.uri.expect("insert should return uri");

        let updated = book_update(uri.clone(), None, None, Some(7), None, None);
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.rows, 1);
        assert_eq!(book_get(uri.clone()).items[0].quantity, 7);

        let empty = book_update(uri.clone(), None, None, None, None, None);
        assert!(!empty.ok);

        let deleted = book_delete(uri.clone());
        assert!(deleted.ok);
        assert_eq!(deleted.rows, 1);
        assert!(book_get(uri.clone()).items.is_empty());
        assert!(!book_delete(uri).ok);
    }

    #[test]
    fn malformed_and_unknown_uris_fail_softly() {
        use_temp_store();
        assert!(!book_delete("not a uri".to_string()).ok);
        let response = book_get("content://ru.kazakova_net.bookstore/authors".to_string());
        assert!(response.items.is_empty());
        assert!(response.message.contains("Cannot query unknown URI"));
        assert_eq!(book_mime_type("content://nowhere/books".to_string()), None);
        assert_eq!(
            book_mime_type("content://ru.kazakova_net.bookstore/books/1".to_string()).as_deref(),
            Some("vnd.android.cursor.item/ru.kazakova_net.bookstore/books")
        );
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
