#![cfg(feature = "sqlite")]

use std::collections::HashMap;

use sql_chain::{Database, Query, SqlChainError, SqlValue};
use tokio::runtime::Runtime;

async fn open_join_db(dir: &tempfile::TempDir) -> Result<Database, Box<dyn std::error::Error>> {
    let path = dir.path().join("joins_test.db");
    let opts = HashMap::from([
        ("adapter".to_string(), "sqlite3".to_string()),
        ("db".to_string(), path.to_string_lossy().into_owned()),
    ]);
    let db = Database::open(&opts).await?;

    db.execute_batch(
        "CREATE TABLE IF NOT EXISTS posts_tags (
            post_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL
        );",
    )
    .await?;

    Ok(db)
}

async fn pairs(db: &Database) -> Result<Vec<(i64, i64)>, Box<dyn std::error::Error>> {
    let rows = db
        .query(
            "SELECT post_id, tag_id FROM posts_tags ORDER BY post_id, tag_id;",
            &[],
        )
        .await?;
    Ok(rows
        .iter()
        .map(|r| {
            (
                r.get("post_id").and_then(SqlValue::as_int).copied().unwrap_or_default(),
                r.get("tag_id").and_then(SqlValue::as_int).copied().unwrap_or_default(),
            )
        })
        .collect())
}

#[test]
fn insert_joins_drops_zero_ids_silently() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_join_db(&dir).await?;

        Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[1, 2], &[3, 0])
            .await?;

        assert_eq!(pairs(&db).await?, vec![(1, 3), (2, 3)]);

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn insert_joins_rejects_empty_id_lists() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_join_db(&dir).await?;

        let err = Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[], &[1])
            .await;
        assert!(matches!(err, Err(SqlChainError::EmptyInput(_))));

        let err = Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[1], &[])
            .await;
        assert!(matches!(err, Err(SqlChainError::EmptyInput(_))));

        // non-empty input that filters down to nothing is not an error and
        // inserts nothing
        Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[0], &[5])
            .await?;
        assert!(pairs(&db).await?.is_empty());

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn insert_join_inserts_a_single_pair() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_join_db(&dir).await?;

        Query::new(&db, "posts_tags", "post_id")
            .insert_join(4, 9)
            .await?;
        assert_eq!(pairs(&db).await?, vec![(4, 9)]);

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn update_joins_replaces_rows_for_one_key() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_join_db(&dir).await?;

        Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[1, 2], &[3])
            .await?;

        // replace post 1's associations; post 2's row must survive
        Query::new(&db, "posts_tags", "post_id")
            .update_joins(1, &[1], &[7, 8])
            .await?;
        assert_eq!(pairs(&db).await?, vec![(1, 7), (1, 8), (2, 3)]);

        // empty id lists just clear the key
        Query::new(&db, "posts_tags", "post_id")
            .update_joins(2, &[], &[])
            .await?;
        assert_eq!(pairs(&db).await?, vec![(1, 7), (1, 8)]);

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn joined_select_filters_through_the_association_table()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = open_join_db(&dir).await?;

        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT
            );",
        )
        .await?;
        for title in ["tagged", "untagged"] {
            let fields = HashMap::from([(
                "title".to_string(),
                SqlValue::Text(title.to_string()),
            )]);
            Query::new(&db, "posts", "id").insert(&fields).await?;
        }
        Query::new(&db, "posts_tags", "post_id")
            .insert_joins(&[1], &[42])
            .await?;

        let rows = Query::new(&db, "posts", "id")
            .join("tag")
            .where_clause("tag_id=?", vec![SqlValue::Int(42)])
            .results()
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("title").and_then(SqlValue::as_text),
            Some("tagged")
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
