//! Book editor session logic.
//!
//! # Responsibility
//! - Hold the five-field form state for one add/edit session.
//! - Bridge save/delete actions to the provider.
//! - Gate leaving the session on unsaved changes.
//!
//! # Invariants
//! - The form is never persisted unless all five fields are non-empty.
//! - Loading a record does not mark the session as changed.
//! - A closed session accepts no further actions.

pub mod controller;
pub mod form;
pub mod notice;
