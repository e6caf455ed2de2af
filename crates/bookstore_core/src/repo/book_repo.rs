//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide filter-based insert/query/update/delete over `books`.
//! - Translate typed filters and sort orders into bound SQL.
//!
//! # Invariants
//! - Every SQL value is bound as a parameter; no caller text is spliced into
//!   statements.
//! - An empty filter matches every row.
//! - Write paths call `BookValues` validation before SQL mutations.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::book::{Book, BookId, BookValidationError, BookValues};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOKS_TABLE: &str = "books";
const BOOK_COLUMNS: &[&str] = &[
    "_id",
    "title",
    "price",
    "quantity",
    "supplier_name",
    "supplier_phone",
];
const BOOK_SELECT_SQL: &str = "SELECT
    _id,
    title,
    price,
    quantity,
    supplier_name,
    supplier_phone
FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One row predicate. Predicates inside a `BookFilter` are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookPredicate {
    Id(BookId),
    TitleEquals(String),
    /// Case-insensitive substring match.
    TitleContains(String),
    SupplierNameEquals(String),
    QuantityAtLeast(i64),
    QuantityAtMost(i64),
    PriceAtMost(i64),
}

/// Row filter used by query, update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    predicates: Vec<BookPredicate>,
}

impl BookFilter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches exactly the row with `id`.
    pub fn by_id(id: BookId) -> Self {
        Self::all().and(BookPredicate::Id(id))
    }

    /// Adds one predicate to the conjunction.
    pub fn and(mut self, predicate: BookPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[BookPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    fn push_where(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if self.predicates.is_empty() {
            return;
        }

        let clauses = self
            .predicates
            .iter()
            .map(|predicate| {
                let (clause, value) = predicate_sql(predicate);
                bind_values.push(value);
                clause
            })
            .collect::<Vec<_>>();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

fn predicate_sql(predicate: &BookPredicate) -> (&'static str, Value) {
    match predicate {
        BookPredicate::Id(id) => ("_id = ?", Value::Integer(*id)),
        BookPredicate::TitleEquals(title) => ("title = ?", Value::Text(title.clone())),
        BookPredicate::TitleContains(fragment) => (
            "instr(lower(title), lower(?)) > 0",
            Value::Text(fragment.clone()),
        ),
        BookPredicate::SupplierNameEquals(name) => {
            ("supplier_name = ?", Value::Text(name.clone()))
        }
        BookPredicate::QuantityAtLeast(quantity) => ("quantity >= ?", Value::Integer(*quantity)),
        BookPredicate::QuantityAtMost(quantity) => ("quantity <= ?", Value::Integer(*quantity)),
        BookPredicate::PriceAtMost(price) => ("price <= ?", Value::Integer(*price)),
    }
}

/// Sortable book column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Id,
    Title,
    Price,
    Quantity,
    SupplierName,
}

impl BookColumn {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Title => "title",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::SupplierName => "supplier_name",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort order for list queries. Ties are always broken by `_id ASC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookSort {
    pub column: BookColumn,
    pub direction: SortDirection,
}

impl BookSort {
    pub fn ascending(column: BookColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: BookColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    fn push_order_by(sort: Option<&BookSort>, sql: &mut String) {
        match sort {
            Some(sort) if sort.column != BookColumn::Id => {
                let direction = match sort.direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY {} {direction}, _id ASC",
                    sort.column.as_sql()
                ));
            }
            Some(BookSort {
                direction: SortDirection::Descending,
                ..
            }) => sql.push_str(" ORDER BY _id DESC"),
            _ => sql.push_str(" ORDER BY _id ASC"),
        }
    }
}

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    /// Validates and inserts a full record, returning its new id.
    fn insert_book(&self, values: &BookValues) -> RepoResult<BookId>;
    fn query_books(&self, filter: &BookFilter, sort: Option<&BookSort>) -> RepoResult<Vec<Book>>;
    /// Validates present fields and writes them to every matching row.
    ///
    /// Returns `0` without touching storage when `values` is empty.
    fn update_books(&self, filter: &BookFilter, values: &BookValues) -> RepoResult<usize>;
    fn delete_books(&self, filter: &BookFilter) -> RepoResult<usize>;
    fn count_books(&self, filter: &BookFilter) -> RepoResult<u64>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the `books` shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_book(&self, values: &BookValues) -> RepoResult<BookId> {
        let book = values.validate_for_insert()?;

        self.conn.execute(
            "INSERT INTO books (
                title,
                price,
                quantity,
                supplier_name,
                supplier_phone
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                book.title,
                book.price,
                book.quantity,
                book.supplier_name,
                book.supplier_phone,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn query_books(&self, filter: &BookFilter, sort: Option<&BookSort>) -> RepoResult<Vec<Book>> {
        let mut sql = BOOK_SELECT_SQL.to_string();
        let mut bind_values: Vec<Value> = Vec::new();
        filter.push_where(&mut sql, &mut bind_values);
        BookSort::push_order_by(sort, &mut sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn update_books(&self, filter: &BookFilter, values: &BookValues) -> RepoResult<usize> {
        values.validate_for_update()?;
        if values.is_empty() {
            return Ok(0);
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(title) = values.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(price) = values.price {
            assignments.push("price = ?");
            bind_values.push(Value::Integer(price));
        }
        if let Some(quantity) = values.quantity {
            assignments.push("quantity = ?");
            bind_values.push(Value::Integer(quantity));
        }
        if let Some(supplier_name) = values.supplier_name.as_ref() {
            assignments.push("supplier_name = ?");
            bind_values.push(Value::Text(supplier_name.clone()));
        }
        if let Some(supplier_phone) = values.supplier_phone.as_ref() {
            assignments.push("supplier_phone = ?");
            bind_values.push(Value::Text(supplier_phone.clone()));
        }

        let mut sql = format!("UPDATE books SET {}", assignments.join(", "));
        filter.push_where(&mut sql, &mut bind_values);

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn delete_books(&self, filter: &BookFilter) -> RepoResult<usize> {
        let mut sql = String::from("DELETE FROM books");
        let mut bind_values: Vec<Value> = Vec::new();
        filter.push_where(&mut sql, &mut bind_values);

        let deleted = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(deleted)
    }

    fn count_books(&self, filter: &BookFilter) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM books");
        let mut bind_values: Vec<Value> = Vec::new();
        filter.push_where(&mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [BOOKS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(BOOKS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([BOOKS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in BOOK_COLUMNS {
        if !present.iter().any(|name| name.as_str() == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOKS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let book = Book {
        id: row.get("_id")?,
        title: row.get("title")?,
        price: row.get("price")?,
        quantity: row.get("quantity")?,
        supplier_name: row.get("supplier_name")?,
        supplier_phone: row.get("supplier_phone")?,
    };

    book.to_values().validate_for_insert().map_err(|err| {
        RepoError::InvalidData(format!(
            "row {} violates `{}`: {err}",
            book.id,
            err.field()
        ))
    })?;
    Ok(book)
}
