//! # storage-adapters
//!
//! Relational implementations of the `domains` repository ports.
//! SQLite (via sqlx) is the default backend; the port boundary keeps other
//! backends possible behind their own feature.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
