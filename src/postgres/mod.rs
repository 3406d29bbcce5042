// PostgreSQL backend - the first client/server dialect.
//
// - params: ToSql bridging from SqlValue
// - rows: result extraction and record building

pub mod params;
pub mod rows;

use std::collections::HashMap;

use deadpool_postgres::{Config as PgConfig, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::error::SqlChainError;
use crate::record::Record;
use crate::value::SqlValue;

/// Options for the `PostgreSQL` backend.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Recognized for contract compatibility; connections are made without
    /// TLS, matching `sslmode=disable`.
    pub sslmode: String,
    /// Log every statement before execution.
    pub debug: bool,
}

impl PostgresOptions {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 5432,
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            sslmode: "disable".to_string(),
            debug: false,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build options from the generic open-options map, merging caller
    /// options over the dialect defaults.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::ConfigError` if `port` is not numeric.
    pub fn from_map(opts: &HashMap<String, String>) -> Result<Self, SqlChainError> {
        let mut options = Self::new(
            opts.get("host").cloned().unwrap_or_else(|| "localhost".to_string()),
            opts.get("user").cloned().unwrap_or_default(),
            opts.get("password").cloned().unwrap_or_default(),
            opts.get("db").cloned().unwrap_or_default(),
        );
        if let Some(port) = opts.get("port") {
            options.port = port
                .parse()
                .map_err(|e| SqlChainError::ConfigError(format!("invalid port {port}: {e}")))?;
        }
        if let Some(sslmode) = opts.get("sslmode") {
            options.sslmode = sslmode.clone();
        }
        options.debug = opts.get("debug").is_some_and(|v| v == "true");
        Ok(options)
    }
}

/// Create the pool and verify connectivity with a ping statement.
///
/// # Errors
///
/// Returns `SqlChainError::ConfigError` for missing fields and
/// `SqlChainError::ConnectionError` if the pool cannot be built or pinged.
pub(crate) async fn connect(opts: &PostgresOptions) -> Result<Pool, SqlChainError> {
    if opts.dbname.is_empty() {
        return Err(SqlChainError::ConfigError("db is required".to_string()));
    }
    if opts.user.is_empty() {
        return Err(SqlChainError::ConfigError("user is required".to_string()));
    }

    let mut cfg = PgConfig::new();
    cfg.host = Some(opts.host.clone());
    cfg.port = Some(opts.port);
    cfg.user = Some(opts.user.clone());
    cfg.password = Some(opts.password.clone());
    cfg.dbname = Some(opts.dbname.clone());

    let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls).map_err(|e| {
        SqlChainError::ConnectionError(format!("failed to create Postgres pool: {e}"))
    })?;

    // Ping so a bad host or database name fails at open time.
    {
        let conn = pool.get().await?;
        conn.simple_query("SELECT 1").await?;
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
    let refs = params::to_refs(args);
    let affected = conn.execute(sql, &refs).await?;
    Ok(affected)
}

/// Execute a multi-statement script.
pub(crate) async fn execute_batch(pool: &Pool, sql: &str) -> Result<(), SqlChainError> {
    let conn = pool.get().await?;
    conn.batch_execute(sql).await?;
    Ok(())
}

/// Execute a SELECT and materialize every row.
pub(crate) async fn execute_select(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<Vec<Record>, SqlChainError> {
    let conn = pool.get().await?;
    let refs = params::to_refs(args);
    let result_rows = conn.query(sql, &refs).await?;
    rows::from_rows(&result_rows)
}

/// Execute an INSERT carrying a `RETURNING` trailer and scan the id.
pub(crate) async fn insert(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<i64, SqlChainError> {
    let conn = pool.get().await?;
    let refs = params::to_refs(args);
    let result_rows = conn.query(sql, &refs).await?;
    let row = result_rows.first().ok_or_else(|| {
        SqlChainError::ExecutionError(format!("insert returned no rows: {sql}"))
    })?;
    rows::extract_value(row, 0)?
        .as_int()
        .copied()
        .ok_or_else(|| {
            SqlChainError::ScanError(format!("insert did not return an integer id: {sql}"))
        })
}

/// Delete-then-reinsert for association rows, inside one transaction.
pub(crate) async fn replace_joins(
    pool: &Pool,
    delete_sql: &str,
    delete_args: &[SqlValue],
    insert_sql: Option<String>,
) -> Result<(), SqlChainError> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;
    let refs = params::to_refs(delete_args);
    tx.execute(delete_sql, &refs).await?;
    if let Some(sql) = insert_sql {
        tx.batch_execute(&sql).await?;
    }
    tx.commit().await?;
    Ok(())
}
