// SQLite-backed store gateway (via sqlx). Each store node is one row
// holding the node's whole JSON subtree.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::PalResult;
use crate::gateway::{StoreGateway, StorePath};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreNode {
    pub path: String,
    pub value: String,
    pub updated_at: String,
}

pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        // Every connection to an in-memory database gets its own copy.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS store_nodes (
                path TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_node(&self, path: &str) -> Result<Option<StoreNode>, sqlx::Error> {
        let row = sqlx::query_as::<_, StoreNode>(
            "SELECT path, value, updated_at FROM store_nodes WHERE path = ?",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn put_node(&self, path: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO store_nodes (path, value) VALUES (?, ?)
            ON CONFLICT(path) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
        "#,
        )
        .bind(path)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_nodes(&self) -> Result<Vec<StoreNode>, sqlx::Error> {
        let rows = sqlx::query_as::<_, StoreNode>(
            "SELECT path, value, updated_at FROM store_nodes ORDER BY path",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl StoreGateway for SqlStore {
    async fn read(&self, path: StorePath) -> PalResult<Option<Value>> {
        match self.get_node(path.as_str()).await? {
            Some(node) => Ok(Some(serde_json::from_str(&node.value)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, path: StorePath, value: &Value) -> PalResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.put_node(path.as_str(), &encoded).await?;
        Ok(())
    }
}
