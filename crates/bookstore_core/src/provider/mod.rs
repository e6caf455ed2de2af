//! URI-addressed data access over the book inventory.
//!
//! # Responsibility
//! - Route `content://` resource identifiers to repository operations.
//! - Publish change events after effective writes.
//!
//! # Invariants
//! - Routing uses an immutable pattern list; no shared mutable matcher.
//! - A change event is published only when a write touched at least one row.

pub mod book_provider;
pub mod notify;
pub mod uri;
