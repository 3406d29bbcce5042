//! The deferred query builder.
//!
//! A [`Query`] accumulates clause fragments and bound arguments and only
//! renders a statement when a terminal operation executes it. Mutators are
//! chainable and every mutation invalidates the cached rendered statement.
//!
//! ```rust,no_run
//! # use sql_chain::{Database, Query, SqlValue};
//! # async fn demo(db: &Database) -> Result<(), sql_chain::SqlChainError> {
//! let mut q = Query::new(db, "pages", "id")
//!     .where_clause("status=?", vec![SqlValue::Int(100)])
//!     .order("created_at desc");
//! let total = q.count().await?;
//! let rows = q.results().await?;
//! # let _ = (total, rows);
//! # Ok(())
//! # }
//! ```

mod exec;
mod joins;
mod render;

use crate::database::Database;
use crate::value::SqlValue;

/// The builder's statement mode: composed clause state, or a raw statement
/// that bypasses composition entirely.
#[derive(Debug, Clone)]
pub(crate) enum Statement {
    Structured(Clauses),
    Raw(String),
}

/// Independently-settable clause fragments, composed in fixed order at
/// render time.
#[derive(Debug, Clone, Default)]
pub(crate) struct Clauses {
    pub(crate) select: String,
    pub(crate) join: String,
    pub(crate) where_sql: String,
    pub(crate) group: String,
    pub(crate) having: String,
    pub(crate) order: String,
    pub(crate) offset: String,
    pub(crate) limit: String,
}

/// A chainable, deferred query against one table.
///
/// Arguments bind positionally: the Nth argument matches the Nth `?` token
/// in the rendered statement, in left-to-right render order. Raw statements
/// with untracked placeholders therefore bind silently wrong — keep args and
/// `?` tokens in step.
///
/// A `Query` is single-owner state; terminal operations may be called more
/// than once and re-render from the same accumulated clauses.
#[derive(Debug, Clone)]
pub struct Query {
    db: Database,
    table: String,
    primary_key: String,
    statement: Statement,
    args: Vec<SqlValue>,
    rendered: Option<String>,
}

impl Query {
    /// Build a new query for a table and its primary-key column.
    #[must_use]
    pub fn new(db: &Database, table: &str, primary_key: &str) -> Self {
        Self {
            db: db.clone(),
            table: table.to_string(),
            primary_key: primary_key.to_string(),
            statement: Statement::Structured(Clauses::default()),
            args: Vec::new(),
            rendered: None,
        }
    }

    /// Replace the projection clause. An empty string restores the default
    /// `SELECT <table>.* FROM <table>`.
    #[must_use]
    pub fn select(mut self, sql: &str) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            c.select = sql.to_string();
        }
        self.invalidate();
        self
    }

    /// Add a WHERE condition. The first call sets `WHERE (cond)`; later
    /// calls extend with `AND (cond)`. Args append to the bound sequence in
    /// call order.
    #[must_use]
    pub fn where_clause(mut self, cond: &str, args: Vec<SqlValue>) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            if c.where_sql.is_empty() {
                c.where_sql = format!("WHERE ({cond})");
            } else {
                c.where_sql = format!("{} AND ({cond})", c.where_sql);
            }
        }
        self.args.extend(args);
        self.invalidate();
        self
    }

    /// Like [`Query::where_clause`] but extends with `OR (cond)`.
    ///
    /// Alternating `where_clause`/`or_where` calls compose left-to-right
    /// without extra grouping; that nesting is the contract, not a bug.
    #[must_use]
    pub fn or_where(mut self, cond: &str, args: Vec<SqlValue>) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            if c.where_sql.is_empty() {
                c.where_sql = format!("WHERE ({cond})");
            } else {
                c.where_sql = format!("{} OR ({cond})", c.where_sql);
            }
        }
        self.args.extend(args);
        self.invalidate();
        self
    }

    /// Add an INNER JOIN through the association table shared with
    /// `other_table`. The join table name is the two pluralized table names
    /// sorted and joined with `_` — a naming convention, not a join planner.
    #[must_use]
    pub fn join(mut self, other_table: &str) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            let sql = joins::join_clause(&self.db, &self.table, other_table);
            if c.join.is_empty() {
                c.join = sql;
            } else {
                c.join = format!("{} {}", c.join, sql);
            }
        }
        self.invalidate();
        self
    }

    /// Set the ORDER BY clause; an empty string clears it.
    #[must_use]
    pub fn order(mut self, sql: &str) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            if sql.is_empty() {
                c.order.clear();
            } else {
                c.order = format!("ORDER BY {sql}");
            }
        }
        self.invalidate();
        self
    }

    /// Set the GROUP BY clause; an empty string clears it.
    #[must_use]
    pub fn group(mut self, sql: &str) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            if sql.is_empty() {
                c.group.clear();
            } else {
                c.group = format!("GROUP BY {sql}");
            }
        }
        self.invalidate();
        self
    }

    /// Set the HAVING clause; an empty string clears it. Args append to the
    /// bound sequence like where-clause args.
    #[must_use]
    pub fn having(mut self, sql: &str, args: Vec<SqlValue>) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            if sql.is_empty() {
                c.having.clear();
            } else {
                c.having = format!("HAVING {sql}");
            }
        }
        self.args.extend(args);
        self.invalidate();
        self
    }

    /// Set the LIMIT clause.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            c.limit = format!("LIMIT {limit}");
        }
        self.invalidate();
        self
    }

    /// Set the OFFSET clause.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        if let Statement::Structured(c) = &mut self.statement {
            c.offset = format!("OFFSET {offset}");
        }
        self.invalidate();
        self
    }

    /// Switch to raw mode: the statement replaces all clause state and
    /// renders verbatim (no composition, no placeholder numbering, no
    /// terminator). Accumulated args are kept and bind positionally; clause
    /// mutations made afterwards are not recombined with the raw text.
    #[must_use]
    pub fn sql(mut self, raw: &str) -> Self {
        self.statement = Statement::Raw(raw.to_string());
        self.invalidate();
        self
    }

    /// Whether the builder is in raw mode.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self.statement, Statement::Raw(_))
    }

    /// The bound argument sequence, in bind order.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Render (and cache) the statement this builder would execute.
    pub fn render_sql(&mut self) -> &str {
        if self.rendered.is_none() {
            self.rendered = Some(render::statement_sql(&self.statement, &self.db, &self.table));
        }
        self.rendered.as_deref().unwrap_or_default()
    }

    fn invalidate(&mut self) {
        self.rendered = None;
    }

    fn table_quoted(&self) -> String {
        self.db.quote_identifier(&self.table)
    }

    fn pk_quoted(&self) -> String {
        self.db.quote_identifier(&self.primary_key)
    }
}
