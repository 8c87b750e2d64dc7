mod db;

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{params, Connection, OptionalExtension};
use zigzagzog_core::CommitmentKey;

use crate::{now_unix_s, StoredCommitment};

/// Outcome of storing a pending reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutResult {
    Inserted,
    /// An earlier commitment under the same key was overwritten.
    Replaced,
}

/// SQLite-backed cache of pending reveals, keyed by the
/// `commitment_{contract}_{player}_{game}_{round}` string.
///
/// The cache is bounded: inserting a new key at capacity evicts the oldest
/// entry. Entries older than the TTL are removed by [`CommitmentStore::sweep`].
pub struct CommitmentStore {
    conn: Mutex<Connection>,
}

impl CommitmentStore {
    /// Open (or create) `commitments.db` under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, String> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("failed to create data dir {}: {e}", data_dir.display()))?;

        let db_path = data_dir.join("commitments.db");
        let conn = Connection::open(&db_path)
            .map_err(|e| format!("failed to open SQLite at {}: {e}", db_path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(|e| format!("failed to set pragmas: {e}"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pending_reveals (
                cache_key     TEXT PRIMARY KEY,
                contract      TEXT NOT NULL,
                player        TEXT NOT NULL,
                game_number   INTEGER NOT NULL,
                round_number  INTEGER NOT NULL,
                chain_id      INTEGER NOT NULL,
                nonce         TEXT NOT NULL,
                circles       INTEGER NOT NULL,
                squares       INTEGER NOT NULL,
                triangles     INTEGER NOT NULL,
                hash          TEXT NOT NULL,
                created_at    INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_pending_reveals_created_at
                ON pending_reveals(created_at);",
        )
        .map_err(|e| format!("failed to create schema: {e}"))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "commitment store lock poisoned".to_string())
    }

    pub fn put(&self, entry: &StoredCommitment, max_entries: usize) -> Result<PutResult, String> {
        let conn = self.conn()?;
        let cache_key = entry.key.to_string();

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM pending_reveals WHERE cache_key = ?1)",
                params![cache_key],
                |row| row.get(0),
            )
            .map_err(|e| format!("put lookup failed: {e}"))?;

        if !exists {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM pending_reveals", [], |row| row.get(0))
                .map_err(|e| format!("put count failed: {e}"))?;

            if count as usize >= max_entries {
                let oldest: Option<String> = conn
                    .query_row(
                        "SELECT cache_key FROM pending_reveals
                         ORDER BY created_at ASC, cache_key ASC
                         LIMIT 1",
                        [],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| format!("put evict lookup failed: {e}"))?;

                if let Some(evicted) = oldest {
                    conn.execute(
                        "DELETE FROM pending_reveals WHERE cache_key = ?1",
                        params![evicted],
                    )
                    .map_err(|e| format!("put evict delete failed: {e}"))?;
                    tracing::info!(evicted_key = %evicted, "evicted oldest pending reveal to make room");
                }
            }
        }

        Self::upsert_row(&conn, &cache_key, entry)?;

        Ok(if exists {
            PutResult::Replaced
        } else {
            PutResult::Inserted
        })
    }

    /// Returns true if the entry existed.
    pub fn delete(&self, key: &CommitmentKey) -> Result<bool, String> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM pending_reveals WHERE cache_key = ?1",
                params![key.to_string()],
            )
            .map_err(|e| format!("delete commitment failed: {e}"))?;
        Ok(deleted > 0)
    }

    pub fn count(&self) -> Result<usize, String> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pending_reveals", [], |row| row.get(0))
            .map_err(|e| format!("count failed: {e}"))?;
        Ok(count as usize)
    }

    /// Remove entries created more than `ttl_secs` ago. Returns how many.
    pub fn sweep(&self, ttl_secs: u64) -> Result<usize, String> {
        let now = i64::try_from(now_unix_s()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM pending_reveals WHERE created_at < ?1",
            params![cutoff],
        )
        .map_err(|e| format!("sweep delete failed: {e}"))
    }
}
