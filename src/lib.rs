//! Deferred, chainable SQL queries over `SQLite`, `PostgreSQL`, and SQL
//! Server.
//!
//! Build a [`Query`] against a [`Database`] handle, chain clause mutators,
//! and nothing touches the wire until a terminal operation (`count`,
//! `results`, `fetch`, `insert`, `update`, `delete`) renders the statement
//! with the backend's placeholder syntax and executes it. Result rows come
//! back as generic [`Record`] field-maps or as caller types through
//! [`FromRecord`].
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use sql_chain::{Database, Query, SqlValue};
//!
//! # async fn demo() -> Result<(), sql_chain::SqlChainError> {
//! let db = Database::open(&HashMap::from([
//!     ("adapter".to_string(), "sqlite3".to_string()),
//!     ("db".to_string(), "app.db".to_string()),
//! ]))
//! .await?;
//!
//! let id = Query::new(&db, "pages", "id")
//!     .insert(&HashMap::from([
//!         ("title".to_string(), SqlValue::Text("Hello".into())),
//!     ]))
//!     .await?;
//!
//! let mut by_id = Query::new(&db, "pages", "id")
//!     .where_clause("id=?", vec![SqlValue::Int(id)]);
//! let page = by_id.first_result().await?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
mod inflect;
pub mod prelude;
pub mod query;
pub mod record;
pub mod render;
pub mod value;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use database::{Database, DatabaseKind};
pub use error::SqlChainError;
pub use query::Query;
pub use record::{FromRecord, Record};
pub use value::SqlValue;
