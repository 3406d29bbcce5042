use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

#[derive(Debug, Error)]
pub enum SqlChainError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool::managed::PoolError<tokio_postgres::Error>),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool::managed::PoolError<rusqlite::Error>),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("database adapter not recognised: {0}")]
    AdapterNotRecognized(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("row scan error: {0}")]
    ScanError(String),

    #[error("no results found for query: {0}")]
    NotFound(String),

    #[error("empty id list for joins insert on {0}")]
    EmptyInput(String),
}

/// Convert `InteractError` to a more specific `SqlChainError`
#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for SqlChainError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        SqlChainError::ConnectionError(format!("SQLite interact error: {err}"))
    }
}
