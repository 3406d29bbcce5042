//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types to make it easier to
//! get started with the library.

pub use crate::database::{Database, DatabaseKind};
pub use crate::error::SqlChainError;
pub use crate::query::Query;
pub use crate::record::{FromRecord, Record};
pub use crate::render::{PlaceholderStyle, number_placeholders};
pub use crate::value::SqlValue;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteOptions;

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresOptions;

#[cfg(feature = "mssql")]
pub use crate::mssql::MssqlOptions;
