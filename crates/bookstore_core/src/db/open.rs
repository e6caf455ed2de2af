//! Connection bootstrap for the inventory store.
//!
//! # Invariants
//! - Returned connections enforce foreign keys, wait on locks for up to
//!   `BUSY_TIMEOUT`, and carry the latest schema.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where an inventory connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    /// Opens, configures and migrates a connection to this location.
    ///
    /// Emits one `db_open` event on success or failure with the elapsed time.
    pub fn open(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let result: DbResult<Connection> = self
            .connect()
            .map_err(DbError::from)
            .and_then(|mut conn| prepare(&mut conn).map(|()| conn));
        let elapsed_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => info!(
                "event=db_open module=db status=ok location={} duration_ms={}",
                self, elapsed_ms
            ),
            Err(err) => error!(
                "event=db_open module=db status=error location={} duration_ms={} error={}",
                self, elapsed_ms, err
            ),
        }
        result
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

impl Display for StoreLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// Opens (or creates) the inventory file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    StoreLocation::File(path.as_ref().to_path_buf()).open()
}

/// Opens a throwaway in-memory inventory.
pub fn open_db_in_memory() -> DbResult<Connection> {
    StoreLocation::Memory.open()
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
