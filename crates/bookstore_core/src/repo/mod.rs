//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts over the `books` table.
//! - Isolate SQLite query details from provider routing and notification.
//!
//! # Invariants
//! - Repository writes validate values before any SQL mutation.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod book_repo;
