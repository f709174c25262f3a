use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:milk_records.db";

/// Durable key-value store backing the record gateway. Records and D3
/// checklist entries live in the same table, separated by key prefix; the
/// store itself knows nothing about either shape.
///
/// SQLite serialises concurrent writes to the same key (last write wins) and
/// reads always observe the latest committed write, which is exactly the
/// consistency the gateway relies on.
#[derive(Clone)]
pub struct RecordStore {
    pool: Arc<SqlitePool>,
}

impl RecordStore {
    /// Open (creating if necessary) the store at the given URL.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open the standard on-disk store.
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Open a fresh in-memory store with a unique name, one per test.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a value under a key, replacing any existing value.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO records (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    /// Retrieve a value by its key.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Delete a key. Returns whether anything was actually removed; deleting
    /// an absent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM records WHERE key = ?")
            .bind(key)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Enumerate every (key, value) pair in the store.
    pub async fn list_entries(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT key, value FROM records ORDER BY key")
            .fetch_all(&*self.pool)
            .await?;
        let entries = rows
            .iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> RecordStore {
        RecordStore::init_test()
            .await
            .expect("Failed to create test store")
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = setup_test().await;

        store
            .put("record_1_abc", r#"{"amount":150}"#)
            .await
            .expect("Failed to put value");

        let value = store.get("record_1_abc").await.expect("Failed to get value");
        assert_eq!(value.as_deref(), Some(r#"{"amount":150}"#));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let store = setup_test().await;

        let value = store.get("record_missing").await.expect("Query failed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_value() {
        let store = setup_test().await;

        store.put("d3_2024-01-10", "[true,false]").await.unwrap();
        store.put("d3_2024-01-10", "[true,true]").await.unwrap();

        let value = store.get("d3_2024-01-10").await.unwrap();
        assert_eq!(value.as_deref(), Some("[true,true]"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = setup_test().await;

        store.put("record_2_xyz", "{}").await.unwrap();

        let deleted = store.delete("record_2_xyz").await.unwrap();
        assert!(deleted);
        assert!(store.get("record_2_xyz").await.unwrap().is_none());

        // Second delete of the same key succeeds without removing anything.
        let deleted_again = store.delete("record_2_xyz").await.unwrap();
        assert!(!deleted_again);
    }

    #[tokio::test]
    async fn test_list_entries() {
        let store = setup_test().await;

        let empty = store.list_entries().await.unwrap();
        assert!(empty.is_empty());

        store.put("d3_2024-01-10", "[false,true]").await.unwrap();
        store.put("record_1_abc", r#"{"amount":120}"#).await.unwrap();
        store.put("record_2_def", r#"{"amount":180}"#).await.unwrap();

        let entries = store.list_entries().await.unwrap();
        assert_eq!(entries.len(), 3);

        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"record_1_abc"));
        assert!(keys.contains(&"d3_2024-01-10"));
    }
}
