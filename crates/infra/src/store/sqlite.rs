//! SQLite-backed stores
//!
//! One database file carries both the opaque key-value table (token cache)
//! and the hashed-to-numeric company-id memo. All writes are idempotent
//! upserts; no multi-statement transactions are required. Synchronous SQL
//! runs on the blocking pool.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use prospectarc_core::ports::{CompanyIdCache, TokenStore};
use prospectarc_domain::{ProspectError, Result};
use rusqlite::{params, Connection};
use tokio::task;

/// Shared SQLite handle implementing both persistence ports
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path and run migrations.
    ///
    /// # Errors
    /// Returns a `Store` error if the database cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(map_sqlite_error)?;
        init_schema(&conn).map_err(map_sqlite_error)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        init_schema(&conn).map_err(map_sqlite_error)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
             key TEXT PRIMARY KEY,
             value TEXT NOT NULL,
             updated_at INTEGER NOT NULL
         );
         CREATE TABLE IF NOT EXISTS company_id_cache (
             hashed_id TEXT PRIMARY KEY,
             numeric_id INTEGER NOT NULL,
             updated_at INTEGER NOT NULL
         );",
    )
}

#[async_trait]
impl TokenStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        task::spawn_blocking(move || -> Result<Option<String>> {
            let conn = conn.lock();
            let mut stmt = conn
                .prepare("SELECT value FROM kv_store WHERE key = ?1")
                .map_err(map_sqlite_error)?;
            match stmt.query_row(params![key], |row| row.get(0)) {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sqlite_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        let value = value.to_string();

        task::spawn_blocking(move || -> Result<()> {
            conn.lock()
                .execute(
                    "INSERT INTO kv_store (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%s', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![key, value],
                )
                .map_err(map_sqlite_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl CompanyIdCache for SqliteStore {
    async fn get_bulk(&self, ids: &[String]) -> Result<HashMap<String, i64>> {
        let conn = Arc::clone(&self.conn);
        let ids = ids.to_vec();

        task::spawn_blocking(move || -> Result<HashMap<String, i64>> {
            let conn = conn.lock();
            let mut stmt = conn
                .prepare("SELECT numeric_id FROM company_id_cache WHERE hashed_id = ?1")
                .map_err(map_sqlite_error)?;

            let mut mapped = HashMap::new();
            for id in &ids {
                match stmt.query_row(params![id], |row| row.get::<_, i64>(0)) {
                    Ok(numeric_id) => {
                        mapped.insert(id.clone(), numeric_id);
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => {}
                    Err(err) => return Err(map_sqlite_error(err)),
                }
            }
            Ok(mapped)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set(&self, id: &str, numeric_id: i64) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            conn.lock()
                .execute(
                    "INSERT INTO company_id_cache (hashed_id, numeric_id, updated_at)
                     VALUES (?1, ?2, strftime('%s', 'now'))
                     ON CONFLICT(hashed_id) DO UPDATE SET
                         numeric_id = excluded.numeric_id,
                         updated_at = excluded.updated_at",
                    params![id, numeric_id],
                )
                .map_err(map_sqlite_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_sqlite_error(err: rusqlite::Error) -> ProspectError {
    ProspectError::Store(err.to_string())
}

fn map_join_error(err: task::JoinError) -> ProspectError {
    if err.is_cancelled() {
        ProspectError::Internal("blocking task cancelled".into())
    } else {
        ProspectError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_kv_round_trip_and_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();

        TokenStore::set(&store, "provider.token", "{\"value\":\"a\"}").await.unwrap();
        TokenStore::set(&store, "provider.token", "{\"value\":\"b\"}").await.unwrap();

        let value = TokenStore::get(&store, "provider.token").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"value\":\"b\"}"));
        assert_eq!(TokenStore::get(&store, "missing").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_company_id_cache_bulk_lookup() {
        let store = SqliteStore::open_in_memory().unwrap();

        CompanyIdCache::set(&store, "hash-a", 100).await.unwrap();
        CompanyIdCache::set(&store, "hash-b", 200).await.unwrap();
        // Upsert replaces the previous mapping
        CompanyIdCache::set(&store, "hash-a", 101).await.unwrap();

        let ids = vec!["hash-a".to_string(), "hash-b".to_string(), "hash-c".to_string()];
        let mapped = store.get_bulk(&ids).await.unwrap();

        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped["hash-a"], 101);
        assert_eq!(mapped["hash-b"], 200);
        assert!(!mapped.contains_key("hash-c"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prospectarc.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            TokenStore::set(&store, "k", "v").await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(TokenStore::get(&reopened, "k").await.unwrap().as_deref(), Some("v"));
    }
}
