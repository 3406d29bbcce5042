use crate::database::Database;
use crate::error::SqlChainError;
use crate::inflect::{to_plural, to_singular};
use crate::render::number_placeholders;
use crate::value::SqlValue;

use super::Query;

impl Query {
    /// Insert one association row; see [`Query::insert_joins`].
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if execution fails.
    pub async fn insert_join(&mut self, a: i64, b: i64) -> Result<(), SqlChainError> {
        self.insert_joins(&[a], &[b]).await
    }

    /// Bulk-insert association rows for every non-zero pair of the cross
    /// product `a × b` (executes SQL). The query's table is the association
    /// table itself. Zero ids are silently skipped; if nothing survives the
    /// filter, nothing executes.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError::EmptyInput` when either id list is empty.
    pub async fn insert_joins(&mut self, a: &[i64], b: &[i64]) -> Result<(), SqlChainError> {
        if a.is_empty() || b.is_empty() {
            return Err(SqlChainError::EmptyInput(self.table.clone()));
        }

        let Some(values) = cross_product_values(a, b) else {
            return Ok(());
        };
        let sql = format!("INSERT INTO {} VALUES {};", self.table_quoted(), values);
        self.db.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Replace the associations of one foreign key: delete every row whose
    /// primary-key column equals `id`, then re-insert the full non-zero
    /// cross product `a × b`. Both steps run inside one driver transaction
    /// and roll back together on failure (executes SQL).
    ///
    /// Empty id lists are allowed here — they clear the associations without
    /// inserting anything.
    ///
    /// # Errors
    ///
    /// Returns `SqlChainError` if the transaction fails.
    pub async fn update_joins(
        &mut self,
        id: i64,
        a: &[i64],
        b: &[i64],
    ) -> Result<(), SqlChainError> {
        let delete_sql = format!(
            "DELETE FROM {} WHERE {}=?;",
            self.table_quoted(),
            self.pk_quoted()
        );
        let delete_sql =
            number_placeholders(&delete_sql, self.db.kind().placeholder_style()).into_owned();

        let insert_sql = if a.is_empty() || b.is_empty() {
            None
        } else {
            cross_product_values(a, b)
                .map(|values| format!("INSERT INTO {} VALUES {};", self.table_quoted(), values))
        };

        self.db
            .replace_joins(&delete_sql, &[SqlValue::Int(id)], insert_sql)
            .await
    }
}

/// `(a,b)` tuples for every non-zero pair, or `None` when the filter leaves
/// nothing to insert. Ids are integers, so they render as literals.
pub(super) fn cross_product_values(a: &[i64], b: &[i64]) -> Option<String> {
    let mut pairs = Vec::with_capacity(a.len() * b.len());
    for av in a {
        for bv in b {
            // no zero values allowed, we simply ignore them
            if *av != 0 && *bv != 0 {
                pairs.push(format!("({av},{bv})"));
            }
        }
    }
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join(","))
    }
}

/// `INNER JOIN <join_table> ON <table>.id = <join_table>.<singular>_id`,
/// with the join table named by sorting the two pluralized table tokens.
pub(super) fn join_clause(db: &Database, table: &str, other_table: &str) -> String {
    let mut tables = [table.to_string(), to_plural(other_table)];
    tables.sort();
    let join_table = format!("{}_{}", tables[0], tables[1]);

    format!(
        "INNER JOIN {} ON {}.id = {}.{}_id",
        db.quote_identifier(&join_table),
        db.quote_identifier(table),
        db.quote_identifier(&join_table),
        to_singular(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_product_drops_zero_ids() {
        assert_eq!(
            cross_product_values(&[1, 2], &[3, 0]),
            Some("(1,3),(2,3)".to_string())
        );
        assert_eq!(cross_product_values(&[0], &[3]), None);
    }

    #[test]
    fn cross_product_orders_pairs_row_major() {
        assert_eq!(
            cross_product_values(&[1, 2], &[3, 4]),
            Some("(1,3),(1,4),(2,3),(2,4)".to_string())
        );
    }
}
