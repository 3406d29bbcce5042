// SQL Server backend - the second client/server dialect.
//
// - params: bind-based parameter passing (tiberius owns bound data)
// - rows: result extraction and record building

pub mod params;
pub mod rows;

use std::collections::HashMap;

use deadpool_tiberius::{Manager, Pool};

use crate::error::SqlChainError;
use crate::record::Record;
use crate::value::SqlValue;

type PooledClient = deadpool::managed::Object<Manager>;

/// Options for the SQL Server backend.
#[derive(Debug, Clone)]
pub struct MssqlOptions {
    pub server: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: String,
    pub instance_name: Option<String>,
    /// Log every statement before execution.
    pub debug: bool,
}

impl MssqlOptions {
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port: None,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            instance_name: None,
            debug: false,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_instance_name(mut self, instance_name: Option<String>) -> Self {
        self.instance_name = instance_name;
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
            opts.get("db").cloned().unwrap_or_default(),
            opts.get("user").cloned().unwrap_or_default(),
            opts.get("password").cloned().unwrap_or_default(),
        );
        if let Some(port) = opts.get("port") {
            let parsed = port
                .parse()
                .map_err(|e| SqlChainError::ConfigError(format!("invalid port {port}: {e}")))?;
            options.port = Some(parsed);
        }
        options.instance_name = opts.get("instance").cloned();
        options.debug = opts.get("debug").is_some_and(|v| v == "true");
        Ok(options)
    }
}

/// Create the pool and verify connectivity with a ping statement.
///
/// # Errors
///
/// Returns `SqlChainError::ConnectionError` if the manager or pool cannot be
/// built, or the ping fails.
pub(crate) async fn connect(opts: &MssqlOptions) -> Result<Pool, SqlChainError> {
    let mut manager = Manager::new()
        .host(&opts.server)
        .database(&opts.database)
        .basic_authentication(&opts.user, &opts.password)
        .trust_cert()
        .max_size(20);
    if let Some(port) = opts.port {
        manager = manager.port(port);
    }
    if let Some(instance) = &opts.instance_name {
        manager = manager.instance_name(instance);
    }

    let pool = manager.create_pool().map_err(|e| {
        SqlChainError::ConnectionError(format!("failed to create SQL Server pool: {e}"))
    })?;

    // Ping so a bad host or database name fails at open time.
    {
        let mut client = get_client(&pool).await?;
        client.simple_query("SELECT 1").await?.into_results().await?;
    }

    Ok(pool)
}

async fn get_client(pool: &Pool) -> Result<PooledClient, SqlChainError> {
    pool.get().await.map_err(|e| {
        SqlChainError::ConnectionError(format!("SQL Server pool error: {e}"))
    })
}

/// Execute a DML statement, returning the affected row count.
pub(crate) async fn execute_dml(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<u64, SqlChainError> {
    let mut client = get_client(pool).await?;
    let query = params::bind_query(sql, args);
    let result = query.execute(&mut *client).await?;
    Ok(result.total())
}

/// Execute a multi-statement script.
pub(crate) async fn execute_batch(pool: &Pool, sql: &str) -> Result<(), SqlChainError> {
    let mut client = get_client(pool).await?;
    client.simple_query(sql).await?.into_results().await?;
    Ok(())
}

/// Execute a SELECT and materialize every row.
pub(crate) async fn execute_select(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<Vec<Record>, SqlChainError> {
    let mut client = get_client(pool).await?;
    let query = params::bind_query(sql, args);
    let stream = query.query(&mut *client).await.map_err(|e| {
        SqlChainError::ExecutionError(format!("SQL Server query error: {e}"))
    })?;
    rows::from_stream(stream).await
}

/// Execute an INSERT carrying a `SCOPE_IDENTITY()` trailer and scan the id.
pub(crate) async fn insert(
    pool: &Pool,
    sql: &str,
    args: &[SqlValue],
) -> Result<i64, SqlChainError> {
    let mut client = get_client(pool).await?;
    let query = params::bind_query(sql, args);
    let results = query
        .query(&mut *client)
        .await
        .map_err(|e| SqlChainError::ExecutionError(format!("SQL Server insert error: {e}")))?
        .into_results()
        .await?;

    // The statement is INSERT followed by the identity SELECT; the id is in
    // the last row set.
    let row = results
        .iter()
        .rev()
        .find_map(|set| set.first())
        .ok_or_else(|| {
            SqlChainError::ExecutionError(format!("insert returned no rows: {sql}"))
        })?;
    row.try_get::<i64, _>(0)?
        .ok_or_else(|| SqlChainError::ScanError(format!("insert did not return an id: {sql}")))
}

/// Delete-then-reinsert for association rows, inside one transaction.
pub(crate) async fn replace_joins(
    pool: &Pool,
    delete_sql: &str,
    delete_args: &[SqlValue],
    insert_sql: Option<String>,
) -> Result<(), SqlChainError> {
    let mut client = get_client(pool).await?;
    client
        .simple_query("BEGIN TRANSACTION")
        .await?
        .into_results()
        .await?;

    match replace_within_tx(&mut client, delete_sql, delete_args, insert_sql).await {
        Ok(()) => {
            client
                .simple_query("COMMIT TRANSACTION")
                .await?
                .into_results()
                .await?;
            Ok(())
        }
        Err(err) => {
            let _ = client.simple_query("ROLLBACK TRANSACTION").await;
            Err(err)
        }
    }
}

async fn replace_within_tx(
    client: &mut PooledClient,
    delete_sql: &str,
    delete_args: &[SqlValue],
    insert_sql: Option<String>,
) -> Result<(), SqlChainError> {
    let query = params::bind_query(delete_sql, delete_args);
    query.execute(&mut **client).await?;
    if let Some(sql) = insert_sql {
        client.simple_query(sql).await?.into_results().await?;
    }
    Ok(())
}
