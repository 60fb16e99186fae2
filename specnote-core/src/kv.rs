//! Persistent key-value collaborator.
//!
//! The annotation store only needs get / set / delete of a serialized blob per
//! string key. [`SqliteKv`] persists to the shared WAL-mode database;
//! [`MemoryKv`] keeps everything in-process for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::future::Future;

use rusqlite::OptionalExtension;
use tokio::sync::Mutex;
use tokio_rusqlite::Connection;

use crate::db::now_secs;
use crate::error::KvError;

/// String-keyed blob storage. Every `set` is a full-value replace.
pub trait KvStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, KvError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), KvError>> + Send;

    /// Removes `key`. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), KvError>> + Send;

    /// Lists every stored key starting with `prefix`, in ascending order.
    fn keys_with_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, KvError>> + Send;
}

/// In-process [`KvStore`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// [`KvStore`] over the `annotations` table of a database opened with
/// [`crate::db::open_db`].
///
/// Writes run inside `BEGIN IMMEDIATE` so a concurrent reader on the same WAL
/// file never observes a half-applied replace.
#[derive(Clone)]
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database at `path` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `KvError` if the database cannot be opened or migrated.
    pub async fn open(path: &str) -> Result<Self, KvError> {
        Ok(Self::new(crate::db::open_db(path).await?))
    }
}

impl KvStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let key = key.to_owned();
        let value = self
            .conn
            .call(move |db| {
                db.query_row(
                    "SELECT value FROM annotations WHERE key = ?1",
                    rusqlite::params![&key],
                    |r| r.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO annotations (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key)
                     DO UPDATE SET value = excluded.value,
                                   updated_at = excluded.updated_at",
                    rusqlite::params![&key, &value, now_secs()],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let key = key.to_owned();
        self.conn
            .call(move |db| {
                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "DELETE FROM annotations WHERE key = ?1",
                    rusqlite::params![&key],
                )?;
                tx.commit()?;
                Ok::<_, rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let prefix = prefix.to_owned();
        let keys = self
            .conn
            .call(move |db| {
                let mut stmt = db.prepare("SELECT key FROM annotations ORDER BY key")?;
                let keys = stmt
                    .query_map([], |r| r.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok::<_, rusqlite::Error>(
                    keys.into_iter().filter(|k| k.starts_with(&prefix)).collect::<Vec<_>>(),
                )
            })
            .await?;
        Ok(keys)
    }
}
