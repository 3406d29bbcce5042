#![cfg(feature = "sqlite")]

use std::collections::HashMap;

use sql_chain::{Database, Query, SqlValue};
use tokio::runtime::Runtime;

async fn open_db(dir: &tempfile::TempDir) -> Result<Database, Box<dyn std::error::Error>> {
    let path = dir.path().join("render_test.db");
    let opts = HashMap::from([
        ("adapter".to_string(), "sqlite3".to_string()),
        ("db".to_string(), path.to_string_lossy().into_owned()),
    ]);
    Ok(Database::open(&opts).await?)
}

#[test]
fn where_clauses_compose_with_and_and_or() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "pages", "id")
            .where_clause("a=?", vec![SqlValue::Int(1)])
            .where_clause("b=?", vec![SqlValue::Int(2)]);
        assert_eq!(
            q.render_sql(),
            "SELECT \"pages\".* FROM \"pages\" WHERE (a=?1) AND (b=?2);"
        );
        assert_eq!(q.args(), &[SqlValue::Int(1), SqlValue::Int(2)]);

        let mut q = Query::new(&db, "pages", "id")
            .where_clause("a=?", vec![SqlValue::Int(1)])
            .or_where("b=?", vec![SqlValue::Int(2)]);
        assert_eq!(
            q.render_sql(),
            "SELECT \"pages\".* FROM \"pages\" WHERE (a=?1) OR (b=?2);"
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn mutations_invalidate_the_rendered_cache() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "pages", "id");
        let plain = q.render_sql().to_string();
        assert_eq!(plain, "SELECT \"pages\".* FROM \"pages\";");

        let mut q = q.order("created_at desc");
        let ordered = q.render_sql().to_string();
        assert_ne!(plain, ordered);
        assert!(ordered.contains("ORDER BY created_at desc"));

        // empty string clears the clause again
        let mut q = q.order("");
        assert_eq!(q.render_sql(), plain);

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn projection_group_having_offset_and_limit_render_in_order()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "pages", "id")
            .select("SELECT status, COUNT(id) AS n FROM pages")
            .group("status")
            .having("COUNT(id) > ?", vec![SqlValue::Int(1)])
            .offset(5)
            .limit(10);
        assert_eq!(
            q.render_sql(),
            "SELECT status, COUNT(id) AS n FROM pages GROUP BY status HAVING COUNT(id) > ?1 OFFSET 5 LIMIT 10;"
        );

        // clearing the projection restores the default
        let mut q = Query::new(&db, "pages", "id").select("SELECT id FROM pages");
        assert_eq!(q.render_sql(), "SELECT id FROM pages;");
        let mut q = q.select("");
        assert_eq!(q.render_sql(), "SELECT \"pages\".* FROM \"pages\";");

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn raw_mode_renders_verbatim_and_ignores_later_clauses()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "pages", "id")
            .where_clause("id=?", vec![SqlValue::Int(7)])
            .sql("SELECT 1 AS x");
        assert!(q.is_raw());
        assert_eq!(q.render_sql(), "SELECT 1 AS x");
        // args accumulated before the raw override are kept
        assert_eq!(q.args(), &[SqlValue::Int(7)]);

        // clause mutations are not recombined with the raw statement
        let mut q = q.order("id desc");
        assert_eq!(q.render_sql(), "SELECT 1 AS x");

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn join_names_the_association_table_deterministically()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "posts", "id").join("tag");
        assert_eq!(
            q.render_sql(),
            "SELECT \"posts\".* FROM \"posts\" \
             INNER JOIN \"posts_tags\" ON \"posts\".id = \"posts_tags\".post_id;"
        );

        // sorting the pluralized tokens makes the name order-independent
        let mut q = Query::new(&db, "tags", "id").join("post");
        assert_eq!(
            q.render_sql(),
            "SELECT \"tags\".* FROM \"tags\" \
             INNER JOIN \"posts_tags\" ON \"tags\".id = \"posts_tags\".tag_id;"
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn consecutive_whitespace_collapses() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_db(&dir).await?;

        let mut q = Query::new(&db, "pages", "id").where_clause("title  =  ?", vec![
            SqlValue::Text("x".to_string()),
        ]);
        assert_eq!(
            q.render_sql(),
            "SELECT \"pages\".* FROM \"pages\" WHERE (title = ?1);"
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
