//! URI-routed CRUD provider over the book inventory.
//!
//! # Responsibility
//! - Route collection and single-item URIs to repository calls.
//! - Validate write payloads and publish change events.
//! - Recover storage write failures into "no result" signals.
//!
//! # Invariants
//! - A single-item URI always replaces the caller filter with `_id = <id>`.
//! - Insert only accepts the collection URI.
//! - Change events are published after writes that touched rows, never
//!   before and never for no-op writes.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::book::{Book, BookId, BookValidationError, BookValues};
use crate::provider::notify::{ChangeNotifier, ChangeSubscription};
use crate::provider::uri::{match_uri, ContentUri, UriMatch, DEFAULT_AUTHORITY};
use crate::repo::book_repo::{
    BookFilter, BookRepository, BookSort, RepoError, RepoResult, SqliteBookRepository,
};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Operation name used in unsupported-URI errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    Query,
    Insert,
    Update,
    Delete,
}

/// Provider-level failure.
#[derive(Debug)]
pub enum ProviderError {
    /// URI shape not routable for the requested operation.
    UnsupportedUri {
        operation: ProviderOperation,
        uri: ContentUri,
    },
    /// URI shape unknown when resolving its MIME type.
    UnknownUri(ContentUri),
    /// A field is missing or out of range.
    InvalidArgument(BookValidationError),
    /// Read-path storage failure.
    Storage(RepoError),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedUri { operation, uri } => match operation {
                ProviderOperation::Query => write!(f, "Cannot query unknown URI {uri}"),
                ProviderOperation::Insert => write!(f, "Insertion is not supported for {uri}"),
                ProviderOperation::Update => write!(f, "Update is not supported for {uri}"),
                ProviderOperation::Delete => write!(f, "Deletion is not supported for {uri}"),
            },
            Self::UnknownUri(uri) => write!(f, "Unknown URI {uri}"),
            Self::InvalidArgument(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProviderError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidArgument(err),
            other => Self::Storage(other),
        }
    }
}

/// Inventory provider: one SQLite connection plus a change channel.
///
/// Shared across threads through `Arc`; connection access is serialized.
pub struct BookStoreProvider {
    authority: String,
    conn: Mutex<Connection>,
    notifier: ChangeNotifier,
}

impl BookStoreProvider {
    /// Wraps an already-migrated connection.
    pub fn new(conn: Connection, authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            conn: Mutex::new(conn),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Opens the inventory file at `path` under `authority`.
    pub fn open(path: impl AsRef<Path>, authority: impl Into<String>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?, authority))
    }

    /// Opens a throwaway in-memory inventory under the default authority.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?, DEFAULT_AUTHORITY))
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Collection URI served by this provider.
    pub fn books_uri(&self) -> ContentUri {
        ContentUri::books(self.authority.as_str())
    }

    /// Single-item URI for `id` served by this provider.
    pub fn book_uri(&self, id: BookId) -> ContentUri {
        self.books_uri().with_appended_id(id)
    }

    /// Returns rows addressed by `uri`.
    ///
    /// Collection URIs honour `filter`; single-item URIs return at most one
    /// row and ignore `filter`.
    pub fn query(
        &self,
        uri: &ContentUri,
        filter: &BookFilter,
        sort: Option<&BookSort>,
    ) -> ProviderResult<Vec<Book>> {
        let filter = self.route(ProviderOperation::Query, uri, filter)?;
        let books = self
            .with_repo(|repo| repo.query_books(&filter, sort))
            .map_err(|err| {
                error!(
                    "event=book_query module=provider status=error uri={} error={}",
                    uri, err
                );
                ProviderError::from(err)
            })?;
        debug!(
            "event=book_query module=provider status=ok uri={} rows={}",
            uri,
            books.len()
        );
        Ok(books)
    }

    /// Inserts a full record through the collection URI.
    ///
    /// Returns the new item URI, or `None` when storage rejected the row.
    ///
    /// # Errors
    /// - `UnsupportedUri` for anything but the collection URI.
    /// - `InvalidArgument` naming the first missing or invalid field.
    pub fn insert(&self, uri: &ContentUri, values: &BookValues) -> ProviderResult<Option<ContentUri>> {
        match match_uri(&self.authority, uri) {
            Some(UriMatch::Books) => {}
            _ => {
                return Err(ProviderError::UnsupportedUri {
                    operation: ProviderOperation::Insert,
                    uri: uri.clone(),
                })
            }
        }
        values
            .validate_for_insert()
            .map_err(ProviderError::InvalidArgument)?;

        match self.with_repo(|repo| repo.insert_book(values)) {
            Ok(id) => {
                info!("event=book_insert module=provider status=ok id={id}");
                self.notifier.publish(uri);
                Ok(Some(uri.with_appended_id(id)))
            }
            Err(RepoError::Validation(err)) => Err(ProviderError::InvalidArgument(err)),
            Err(err) => {
                error!(
                    "event=book_insert module=provider status=error uri={} error_code=insert_failed error={}",
                    uri, err
                );
                Ok(None)
            }
        }
    }

    /// Writes the present fields of `values` to the rows addressed by `uri`.
    ///
    /// Returns the number of rows changed; `0` for an empty payload, for no
    /// matching row, or when storage rejected the write.
    pub fn update(
        &self,
        uri: &ContentUri,
        values: &BookValues,
        filter: &BookFilter,
    ) -> ProviderResult<usize> {
        let filter = self.route(ProviderOperation::Update, uri, filter)?;
        values
            .validate_for_update()
            .map_err(ProviderError::InvalidArgument)?;
        if values.is_empty() {
            return Ok(0);
        }

        let changed = match self.with_repo(|repo| repo.update_books(&filter, values)) {
            Ok(changed) => changed,
            Err(RepoError::Validation(err)) => return Err(ProviderError::InvalidArgument(err)),
            Err(err) => {
                error!(
                    "event=book_update module=provider status=error uri={} error_code=update_failed error={}",
                    uri, err
                );
                0
            }
        };

        if changed > 0 {
            info!("event=book_update module=provider status=ok uri={uri} rows={changed}");
            self.notifier.publish(uri);
        } else {
            warn!("event=book_update module=provider status=noop uri={uri}");
        }
        Ok(changed)
    }

    /// Deletes the rows addressed by `uri`.
    ///
    /// An empty filter on the collection URI deletes every row.
    pub fn delete(&self, uri: &ContentUri, filter: &BookFilter) -> ProviderResult<usize> {
        let filter = self.route(ProviderOperation::Delete, uri, filter)?;

        let deleted = match self.with_repo(|repo| repo.delete_books(&filter)) {
            Ok(deleted) => deleted,
            Err(err) => {
                error!(
                    "event=book_delete module=provider status=error uri={} error_code=delete_failed error={}",
                    uri, err
                );
                0
            }
        };

        if deleted > 0 {
            info!("event=book_delete module=provider status=ok uri={uri} rows={deleted}");
            self.notifier.publish(uri);
        }
        Ok(deleted)
    }

    /// MIME type for the resource kind behind `uri`.
    pub fn get_type(&self, uri: &ContentUri) -> ProviderResult<String> {
        match_uri(&self.authority, uri)
            .map(|matched| matched.mime_type(&self.authority))
            .ok_or_else(|| ProviderError::UnknownUri(uri.clone()))
    }

    /// Subscribes to changes related to `uri`.
    pub fn subscribe(&self, uri: &ContentUri) -> ChangeSubscription {
        self.notifier.subscribe(uri.clone())
    }

    /// Fetches the first row addressed by `uri` on the blocking pool.
    ///
    /// Resolves to `Ok(None)` when no row matched.
    ///
    /// # Errors
    /// - `FetchError::Provider` for routing and storage errors from `query`.
    /// - `FetchError::Cancelled` when the blocking task did not complete.
    pub async fn fetch(self: Arc<Self>, uri: ContentUri) -> Result<Option<Book>, FetchError> {
        let joined = tokio::task::spawn_blocking(move || {
            self.query(&uri, &BookFilter::all(), None)
                .map(|books| books.into_iter().next())
        })
        .await;

        match joined {
            Ok(result) => result.map_err(FetchError::Provider),
            Err(err) => {
                warn!("event=book_fetch module=provider status=cancelled error={err}");
                Err(FetchError::Cancelled)
            }
        }
    }

    fn route(
        &self,
        operation: ProviderOperation,
        uri: &ContentUri,
        filter: &BookFilter,
    ) -> ProviderResult<BookFilter> {
        match match_uri(&self.authority, uri) {
            Some(UriMatch::Books) => Ok(filter.clone()),
            Some(UriMatch::BookId(id)) => Ok(BookFilter::by_id(id)),
            None => {
                warn!(
                    "event=uri_route module=provider status=error uri={} error_code=unsupported_uri",
                    uri
                );
                Err(ProviderError::UnsupportedUri {
                    operation,
                    uri: uri.clone(),
                })
            }
        }
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteBookRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let repo = SqliteBookRepository::try_new(&conn)?;
        f(&repo)
    }
}

/// Async fetch failure.
#[derive(Debug)]
pub enum FetchError {
    Provider(ProviderError),
    /// The blocking task was cancelled or panicked before producing a row.
    Cancelled,
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "book fetch was cancelled"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}
