//! End-to-end tests over the bundled SQLite driver.

#![cfg(feature = "sqlite")]

use sqltx::driver::SqliteDriver;
use sqltx::{PoolConfig, TxError, create_pool, params};
use tempfile::TempDir;

async fn test_pool() -> (TempDir, sqltx::PoolFacade<sqltx::driver::sqlite::SqliteDriverPool>) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    let pool = create_pool(&SqliteDriver, PoolConfig::new(url)).unwrap();
    pool.query(
        "CREATE TABLE people (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER)",
        vec![],
    )
    .await
    .unwrap();
    (dir, pool)
}

#[tokio::test]
async fn test_insert_select_roundtrip() {
    let (_dir, pool) = test_pool().await;

    let inserted = pool
        .insert("INSERT INTO people(name, age) VALUES(?, ?)", params!["alice", 34])
        .await
        .unwrap();
    assert_eq!(inserted.affected_rows, 1);
    assert_eq!(inserted.insert_id, Some(1));

    let out = pool
        .select("SELECT name, age FROM people WHERE id = ?", params![1])
        .await
        .unwrap();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0]["name"], "alice");
    assert_eq!(out.rows[0]["age"], 34);
    assert_eq!(out.fields.len(), 2);
    assert_eq!(out.fields[0].name, "name");

    pool.destroy().await;
}

#[tokio::test]
async fn test_update_and_delete_report_affected_rows() {
    let (_dir, pool) = test_pool().await;

    pool.insert("INSERT INTO people(name) VALUES(?)", params!["alice"])
        .await
        .unwrap();
    pool.insert("INSERT INTO people(name) VALUES(?)", params!["bob"])
        .await
        .unwrap();

    let updated = pool
        .update("UPDATE people SET age = ? WHERE name = ?", params![40, "bob"])
        .await
        .unwrap();
    assert_eq!(updated.affected_rows, 1);
    assert_eq!(updated.insert_id, None);

    let deleted = pool.del("DELETE FROM people", vec![]).await.unwrap();
    assert_eq!(deleted.affected_rows, 2);
    assert_eq!(deleted.insert_id, None);
}

#[tokio::test]
async fn test_transactional_work_commits() {
    let (_dir, pool) = test_pool().await;

    let id = pool
        .with_connection(
            |conn| {
                Box::pin(async move {
                    let first = conn
                        .insert("INSERT INTO people(name) VALUES(?)", params!["alice"])
                        .await?;
                    conn.update(
                        "UPDATE people SET age = ? WHERE id = ?",
                        params![34, first.insert_id.unwrap() as i64],
                    )
                    .await?;
                    Ok(first.insert_id.unwrap())
                })
            },
            true,
        )
        .await
        .unwrap();

    let out = pool
        .select("SELECT age FROM people WHERE id = ?", params![id as i64])
        .await
        .unwrap();
    assert_eq!(out.rows[0]["age"], 34);
}

#[tokio::test]
async fn test_failing_work_rolls_back() {
    let (_dir, pool) = test_pool().await;

    let err = pool
        .with_connection(
            |conn| {
                Box::pin(async move {
                    conn.insert("INSERT INTO people(name) VALUES(?)", params!["ghost"])
                        .await?;
                    Err::<(), _>(TxError::app("boom"))
                })
            },
            true,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");

    // The insert was rolled back; the table stayed empty.
    let out = pool.select("SELECT * FROM people", vec![]).await.unwrap();
    assert!(out.rows.is_empty());
}

#[tokio::test]
async fn test_statement_error_surfaces_and_pool_stays_usable() {
    let (_dir, pool) = test_pool().await;

    let err = pool
        .select("SELECT * FROM no_such_table", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, TxError::Query { .. }));

    // The connection went back to the pool despite the failure.
    pool.insert("INSERT INTO people(name) VALUES(?)", params!["alice"])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_destroyed_pool_rejects_work() {
    let (_dir, pool) = test_pool().await;
    pool.destroy().await;
    pool.destroy().await;

    let err = pool.select("SELECT 1", vec![]).await.unwrap_err();
    assert!(matches!(err, TxError::PoolDestroyed));
}
