// SQLite backend - the embedded-file dialect.
//
// Split into sub-modules the same way as the other backends:
// - params: parameter conversion from SqlValue to rusqlite values
// - rows: result extraction and record building
//
// All driver work happens inside the pool's `interact` closure because
// rusqlite connections are blocking.

pub mod params;
pub mod rows;

use std::collections::HashMap;

use deadpool_sqlite::{Config as SqliteConfig, Pool, Runtime, rusqlite};

use crate::error::SqlChainError;
use crate::record::Record;
use crate::value::SqlValue;

/// Options for the embedded-file backend.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// Database file path (rusqlite URI filenames are accepted).
    pub path: String,
    /// Log every statement before execution.
    pub debug: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            debug: false,
        }
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build options from the generic open-options map, merging caller
    /// options over the dialect defaults.
    #[must_use]
    pub fn from_map(opts: &HashMap<String, String>) -> Self {
        Self {
            path: opts.get("db").cloned().unwrap_or_default(),
            debug: opts.get("debug").is_some_and(|v| v == "true"),
        }
    }
}

/// Create the pool and verify the database is reachable.
///
/// # Errors
///
/// Returns `SqlChainError::ConnectionError` if pool creation or the initial
/// smoke statement fails.
pub(crate) async fn connect(opts: &SqliteOptions) -> Result<Pool, SqlChainError> {
    let cfg = SqliteConfig::new(opts.path.clone());

    let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
        SqlChainError::ConnectionError(format!("failed to create SQLite pool: {e}"))
    })?;

    // Ping: open one connection and run a pragma so a bad path fails here,
    // not at the first query.
    {
        let conn = pool.get().await?;
        conn.interact(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(SqlChainError::SqliteError)
        })
        .await??;
    }

    Ok(pool)
}

/// Execute a DML statement, returning the affected row count.
pub(crate) async fn execute_dml(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<u64, SqlChainError> {
    let conn = pool.get().await?;
    let sql = sql.to_owned();
    let values = params::to_values(args);
    conn.interact(move |conn| -> Result<u64, SqlChainError> {
        let mut stmt = conn.prepare(&sql)?;
        let affected = stmt.execute(rusqlite::params_from_iter(values))?;
        Ok(affected as u64)
    })
    .await?
}

/// Execute a multi-statement script with auto-commit.
pub(crate) async fn execute_batch(pool: &Pool, sql: &str) -> Result<(), SqlChainError> {
    let conn = pool.get().await?;
    let sql = sql.to_owned();
    conn.interact(move |conn| -> Result<(), SqlChainError> {
        conn.execute_batch(&sql)?;
        Ok(())
    })
    .await?
}

/// Execute a SELECT and materialize every row.
pub(crate) async fn execute_select(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<Vec<Record>, SqlChainError> {
    let conn = pool.get().await?;
    let sql = sql.to_owned();
    let values = params::to_values(args);
    conn.interact(move |conn| -> Result<Vec<Record>, SqlChainError> {
        let mut stmt = conn.prepare(&sql)?;
        rows::read_rows(&mut stmt, values)
    })
    .await?
}

/// Execute an INSERT and return the driver-reported last insert id.
pub(crate) async fn insert(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<i64, SqlChainError> {
    let conn = pool.get().await?;
    let sql = sql.to_owned();
    let values = params::to_values(args);
    conn.interact(move |conn| -> Result<i64, SqlChainError> {
        let mut stmt = conn.prepare(&sql)?;
        stmt.execute(rusqlite::params_from_iter(values))?;
        Ok(conn.last_insert_rowid())
    })
    .await?
}

/// Delete-then-reinsert for association rows, inside one transaction.
pub(crate) async fn replace_joins(
    pool: &Pool,
    delete_sql: &str,
    delete_args: &[SqlValue],
    insert_sql: Option<String>,
) -> Result<(), SqlChainError> {
    let conn = pool.get().await?;
    let delete_sql = delete_sql.to_owned();
    let delete_values = params::to_values(delete_args);
    conn.interact(move |conn| -> Result<(), SqlChainError> {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&delete_sql)?;
            stmt.execute(rusqlite::params_from_iter(delete_values))?;
        }
        if let Some(sql) = insert_sql {
            tx.execute_batch(&sql)?;
        }
        tx.commit()?;
        Ok(())
    })
    .await?
}
