use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_rusqlite::Connection;

use crate::error::KvError;

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// `busy_timeout` is set through the `Connection` method rather than a PRAGMA
/// string so it takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `KvError` if the file cannot be opened, WAL configuration fails,
/// or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, KvError> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        // Fold any WAL left behind by a previous run back into the main file.
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    tracing::debug!(path, "annotation database opened");
    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
