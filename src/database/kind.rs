use chrono::NaiveDateTime;
use clap::ValueEnum;

use crate::render::PlaceholderStyle;

/// The database backend behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseKind {
    /// `SQLite` embedded-file database
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// `PostgreSQL` database
    #[cfg(feature = "postgres")]
    Postgres,
    /// SQL Server database
    #[cfg(feature = "mssql")]
    Mssql,
}

impl DatabaseKind {
    /// The positional placeholder syntax this backend binds with.
    #[must_use]
    pub fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseKind::Sqlite => PlaceholderStyle::Sqlite,
            #[cfg(feature = "postgres")]
            DatabaseKind::Postgres => PlaceholderStyle::Postgres,
            #[cfg(feature = "mssql")]
            DatabaseKind::Mssql => PlaceholderStyle::Mssql,
        }
    }

    /// The bind-parameter token for a 1-based position.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        self.placeholder_style().token(index)
    }

    /// Wrap and escape a table or column name in this backend's syntax.
    #[must_use]
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseKind::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
            #[cfg(feature = "postgres")]
            DatabaseKind::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
            #[cfg(feature = "mssql")]
            DatabaseKind::Mssql => format!("[{}]", name.replace(']', "]]")),
        }
    }

    /// SQL suffix appended to an INSERT so the generated id can be
    /// retrieved. Empty when the driver reports a last-insert-id itself.
    #[must_use]
    pub fn insert_trailer(self, primary_key: &str) -> String {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseKind::Sqlite => String::new(),
            #[cfg(feature = "postgres")]
            DatabaseKind::Postgres => {
                format!("RETURNING {}", self.quote_identifier(primary_key))
            }
            #[cfg(feature = "mssql")]
            DatabaseKind::Mssql => {
                let _ = primary_key;
                "; SELECT CAST(SCOPE_IDENTITY() AS BIGINT)".to_string()
            }
        }
    }

    /// Canonical timestamp literal for this backend.
    #[must_use]
    pub fn time_to_string(self, timestamp: NaiveDateTime) -> String {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseKind::Sqlite => timestamp.format("%F %T%.f").to_string(),
            #[cfg(feature = "postgres")]
            DatabaseKind::Postgres => timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            #[cfg(feature = "mssql")]
            DatabaseKind::Mssql => timestamp.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_syntax() {
        let kind = DatabaseKind::Sqlite;
        assert_eq!(kind.quote_identifier("pages"), "\"pages\"");
        assert_eq!(kind.placeholder(3), "?3");
        assert_eq!(kind.insert_trailer("id"), "");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_syntax() {
        let kind = DatabaseKind::Postgres;
        assert_eq!(kind.quote_identifier("pages"), "\"pages\"");
        assert_eq!(kind.quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(kind.placeholder(1), "$1");
        assert_eq!(kind.insert_trailer("id"), "RETURNING \"id\"");
    }

    #[cfg(feature = "mssql")]
    #[test]
    fn mssql_syntax() {
        let kind = DatabaseKind::Mssql;
        assert_eq!(kind.quote_identifier("pages"), "[pages]");
        assert_eq!(kind.quote_identifier("we]ird"), "[we]]ird]");
        assert_eq!(kind.placeholder(2), "@P2");
        assert!(kind.insert_trailer("id").contains("SCOPE_IDENTITY"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn timestamp_literals() {
        let ts = chrono::NaiveDateTime::parse_from_str(
            "2024-01-01 08:00:01",
            "%Y-%m-%d %H:%M:%S",
        )
        .expect("valid timestamp");
        assert_eq!(DatabaseKind::Sqlite.time_to_string(ts), "2024-01-01 08:00:01");
    }
}
