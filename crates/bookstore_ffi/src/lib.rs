//! Flutter-facing bridge for the bookstore core.

pub mod api;
