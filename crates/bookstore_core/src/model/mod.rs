//! Inventory domain model.
//!
//! # Responsibility
//! - Define the canonical book record and its write-side value set.
//! - Own the per-field validation rules shared by insert and update paths.
//!
//! # Invariants
//! - Every persisted book satisfies all five field rules at once.
//! - Book ids are assigned by storage and never change afterwards.

pub mod book;
