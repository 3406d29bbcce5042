//! The database handle: an explicit, cloneable value over one backend pool.
//!
//! Builders resolve their execution target through the handle they were
//! constructed with, so separate logical databases can coexist in one
//! process. Statement-level concurrency is delegated to the underlying pool
//! and driver; the handle itself holds no locks and caches no results.

mod kind;

pub use kind::DatabaseKind;

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::SqlChainError;
use crate::record::Record;
use crate::value::SqlValue;

#[cfg(feature = "mssql")]
use crate::mssql;
#[cfg(feature = "postgres")]
use crate::postgres;
#[cfg(feature = "sqlite")]
use crate::sqlite;

/// A handle to one logical database.
///
/// Cloning is cheap (the pool is shared). All executing methods are async
/// and complete when the driver returns or errors; there is no retry,
/// cancellation, or timeout layer here.
#[derive(Clone, Debug)]
pub struct Database {
    pool: DatabasePool,
    debug: bool,
}

#[derive(Clone)]
enum DatabasePool {
    #[cfg(feature = "sqlite")]
    Sqlite(deadpool_sqlite::Pool),
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Pool),
    #[cfg(feature = "mssql")]
    Mssql(deadpool_tiberius::Pool),
}

// Manual Debug implementation because the SQL Server pool does not expose one
impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(pool).finish(),
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(pool).finish(),
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => f.debug_tuple("Mssql").field(&"<TiberiusPool>").finish(),
        }
    }
}

impl Database {
    /// Open a database from a generic options map.
    ///
    /// The `adapter` key selects the dialect (`sqlite3`, `postgres`,
    /// `mssql`); remaining keys are merged over the dialect defaults
    /// (`user`, `password`, `db`, `host`, `port`, `sslmode`, `instance`).
    /// `debug` set to `"true"` logs every statement before execution.
    /// Connectivity is verified before the handle is returned.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::AdapterNotRecognized` for an unknown adapter
    /// key, `SqlChainError::ConfigError` for invalid options, and
    /// `SqlChainError::ConnectionError` if the backend cannot be reached.
    pub async fn open(opts: &HashMap<String, String>) -> Result<Self, SqlChainError> {
        match opts.get("adapter").map(String::as_str) {
            #[cfg(feature = "sqlite")]
            Some("sqlite3") => Self::new_sqlite(sqlite::SqliteOptions::from_map(opts)).await,
            #[cfg(feature = "postgres")]
            Some("postgres") => {
                Self::new_postgres(postgres::PostgresOptions::from_map(opts)?).await
            }
            #[cfg(feature = "mssql")]
            Some("mssql") => Self::new_mssql(mssql::MssqlOptions::from_map(opts)?).await,
            Some(other) => Err(SqlChainError::AdapterNotRecognized(other.to_string())),
            None => Err(SqlChainError::AdapterNotRecognized(
                "missing adapter option".to_string(),
            )),
        }
    }

    /// Open an embedded-file `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::ConnectionError` if pool creation or the
    /// connectivity check fails.
    #[cfg(feature = "sqlite")]
    pub async fn new_sqlite(opts: sqlite::SqliteOptions) -> Result<Self, SqlChainError> {
        let pool = sqlite::connect(&opts).await?;
        Ok(Self {
            pool: DatabasePool::Sqlite(pool),
            debug: opts.debug,
        })
    }

    /// Open a `PostgreSQL` database.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::ConfigError` if required fields are missing or
    /// `SqlChainError::ConnectionError` if the pool cannot be built or pinged.
    #[cfg(feature = "postgres")]
    pub async fn new_postgres(opts: postgres::PostgresOptions) -> Result<Self, SqlChainError> {
        let pool = postgres::connect(&opts).await?;
        Ok(Self {
            pool: DatabasePool::Postgres(pool),
            debug: opts.debug,
        })
    }

    /// Open a SQL Server database.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::ConnectionError` if the pool cannot be built
    /// or pinged.
    #[cfg(feature = "mssql")]
    pub async fn new_mssql(opts: mssql::MssqlOptions) -> Result<Self, SqlChainError> {
        let pool = mssql::connect(&opts).await?;
        Ok(Self {
            pool: DatabasePool::Mssql(pool),
            debug: opts.debug,
        })
    }

    /// The backend this handle talks to.
    #[must_use]
    pub fn kind(&self) -> DatabaseKind {
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(_) => DatabaseKind::Sqlite,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(_) => DatabaseKind::Postgres,
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(_) => DatabaseKind::Mssql,
        }
    }

    /// Close the underlying pool. Idempotent; in-flight statements finish,
    /// new ones fail with a pool error.
    pub fn close(&self) {
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => pool.close(),
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => pool.close(),
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => pool.close(),
        }
    }

    /// Execute a DML statement with positional args, returning the affected
    /// row count.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<u64, SqlChainError> {
        self.log_statement(sql, args);
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => sqlite::execute_dml(pool, sql, args).await,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => postgres::execute_dml(pool, sql, args).await,
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => mssql::execute_dml(pool, sql, args).await,
        }
    }

    /// Execute a multi-statement script (no parameters).
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), SqlChainError> {
        self.log_statement(sql, &[]);
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => sqlite::execute_batch(pool, sql).await,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => postgres::execute_batch(pool, sql).await,
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => mssql::execute_batch(pool, sql).await,
        }
    }

    /// Execute a SELECT with positional args and materialize every row.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution or row decoding fails.
    pub async fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Record>, SqlChainError> {
        self.log_statement(sql, args);
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => sqlite::execute_select(pool, sql, args).await,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => postgres::execute_select(pool, sql, args).await,
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => mssql::execute_select(pool, sql, args).await,
        }
    }

    /// Execute an INSERT (already carrying this backend's trailer) and
    /// return the generated primary key.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails or no id comes back.
    pub async fn insert(&self, sql: &str, args: &[SqlValue]) -> Result<i64, SqlChainError> {
        self.log_statement(sql, args);
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => sqlite::insert(pool, sql, args).await,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => postgres::insert(pool, sql, args).await,
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => mssql::insert(pool, sql, args).await,
        }
    }

    /// Delete association rows matching `delete_sql`, then run the optional
    /// bulk re-insert, atomically inside one driver transaction.
    pub(crate) async fn replace_joins(
        &self,
        delete_sql: &str,
        delete_args: &[SqlValue],
        insert_sql: Option<String>,
    ) -> Result<(), SqlChainError> {
        self.log_statement(delete_sql, delete_args);
        if let Some(sql) = &insert_sql {
            self.log_statement(sql, &[]);
        }
        match &self.pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => {
                sqlite::replace_joins(pool, delete_sql, delete_args, insert_sql).await
            }
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => {
                postgres::replace_joins(pool, delete_sql, delete_args, insert_sql).await
            }
            #[cfg(feature = "mssql")]
            DatabasePool::Mssql(pool) => {
                mssql::replace_joins(pool, delete_sql, delete_args, insert_sql).await
            }
        }
    }

    /// Wrap and escape a table or column name for this backend.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        self.kind().quote_identifier(name)
    }

    /// The bind-parameter token for a 1-based position.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        self.kind().placeholder(index)
    }

    /// SQL suffix appended to INSERT statements to retrieve the generated id.
    #[must_use]
    pub fn insert_trailer(&self, primary_key: &str) -> String {
        self.kind().insert_trailer(primary_key)
    }

    /// Canonical timestamp literal for this backend.
    #[must_use]
    pub fn time_to_string(&self, timestamp: NaiveDateTime) -> String {
        self.kind().time_to_string(timestamp)
    }

    fn log_statement(&self, sql: &str, args: &[SqlValue]) {
        if self.debug {
            tracing::debug!(target: "sql_chain::stmt", %sql, ?args, "executing statement");
        }
    }
}
