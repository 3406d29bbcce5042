use crate::database::Database;
use crate::render::number_placeholders;

use super::Statement;

/// Render a statement to its executable SQL text.
///
/// Structured statements compose `select join where group having order
/// offset limit` in that fixed order, collapse consecutive whitespace,
/// number the `?` tokens left-to-right in the backend's placeholder syntax,
/// and append the terminator. Raw statements pass through untouched.
pub(super) fn statement_sql(statement: &Statement, db: &Database, table: &str) -> String {
    match statement {
        Statement::Raw(sql) => sql.clone(),
        Statement::Structured(c) => {
            let table_q = db.quote_identifier(table);
            let select = if c.select.is_empty() {
                format!("SELECT {table_q}.* FROM {table_q}")
            } else {
                c.select.clone()
            };

            let composed = [
                select.as_str(),
                c.join.as_str(),
                c.where_sql.as_str(),
                c.group.as_str(),
                c.having.as_str(),
                c.order.as_str(),
                c.offset.as_str(),
                c.limit.as_str(),
            ]
            .join(" ");
            let collapsed = composed.split_whitespace().collect::<Vec<_>>().join(" ");

            let numbered = number_placeholders(&collapsed, db.kind().placeholder_style());
            format!("{numbered};")
        }
    }
}
