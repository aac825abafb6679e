//! Snapshot store implementations
//!
//! The session manager only sees the [`SnapshotStore`] trait; it treats the
//! store as an opaque keyed collection of snapshots and never names a
//! concrete database.

use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;

use super::models::GameSnapshot;

/// Opaque keyed persistence for session snapshots
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &GameSnapshot) -> Result<()>;
    fn load(&self, session_id: &str) -> Result<Option<GameSnapshot>>;
    fn list(&self) -> Result<Vec<GameSnapshot>>;
}

/// SQLite-backed store. The history column holds a JSON array of UCI moves.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.lock().unwrap().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                white_player TEXT NOT NULL,
                black_player TEXT NOT NULL,
                fen TEXT NOT NULL,
                history TEXT NOT NULL,
                status TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_updated_at ON sessions(updated_at);
            "#,
        )?;
        Ok(())
    }

    pub fn count_sessions(&self) -> Result<u32> {
        let conn = self.conn.lock().unwrap();
        let count: u32 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count)
    }
}

struct SessionRow {
    session_id: String,
    white_player: String,
    black_player: String,
    fen: String,
    history: String,
    status: String,
    updated_at: u64,
}

fn row_to_snapshot(row: SessionRow) -> Result<GameSnapshot> {
    Ok(GameSnapshot {
        session_id: row.session_id,
        white_player: row.white_player,
        black_player: row.black_player,
        fen: row.fen,
        history: serde_json::from_str(&row.history)?,
        status: row.status,
        updated_at: row.updated_at,
    })
}

impl SnapshotStore for SqliteStore {
    fn save(&self, snapshot: &GameSnapshot) -> Result<()> {
        let history = serde_json::to_string(&snapshot.history)?;
        self.conn.lock().unwrap().execute(
            r#"
            INSERT INTO sessions
            (session_id, white_player, black_player, fen, history, status, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(session_id) DO UPDATE SET
                fen = excluded.fen,
                history = excluded.history,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
            params![
                snapshot.session_id,
                snapshot.white_player,
                snapshot.black_player,
                snapshot.fen,
                history,
                snapshot.status,
                snapshot.updated_at,
            ],
        )?;
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<GameSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT session_id, white_player, black_player, fen, history, status, updated_at
             FROM sessions WHERE session_id = ?1",
        )?;

        let row = stmt
            .query_row(params![session_id], |row| {
                Ok(SessionRow {
                    session_id: row.get(0)?,
                    white_player: row.get(1)?,
                    black_player: row.get(2)?,
                    fen: row.get(3)?,
                    history: row.get(4)?,
                    status: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })
            .ok();

        match row {
            Some(row) => Ok(Some(row_to_snapshot(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<GameSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT session_id, white_player, black_player, fen, history, status, updated_at
             FROM sessions ORDER BY updated_at DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SessionRow {
                    session_id: row.get(0)?,
                    white_player: row.get(1)?,
                    black_player: row.get(2)?,
                    fen: row.get(3)?,
                    history: row.get(4)?,
                    status: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(row_to_snapshot).collect()
    }
}

/// In-memory store for tests and ephemeral hosts
pub struct MemoryStore {
    snapshots: Mutex<HashMap<String, GameSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            snapshots: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, snapshot: &GameSnapshot) -> Result<()> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(snapshot.session_id.clone(), snapshot.clone());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<GameSnapshot>> {
        Ok(self.snapshots.lock().unwrap().get(session_id).cloned())
    }

    fn list(&self) -> Result<Vec<GameSnapshot>> {
        let mut all: Vec<GameSnapshot> =
            self.snapshots.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> GameSnapshot {
        GameSnapshot {
            session_id: id.to_string(),
            white_player: "alice".to_string(),
            black_player: "bob".to_string(),
            fen: crate::board::STARTING_FEN.to_string(),
            history: vec!["e2e4".to_string(), "c7c5".to_string()],
            status: "in_progress".to_string(),
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_sqlite_save_load_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load("missing").unwrap().is_none());

        store.save(&sample("abc123")).unwrap();
        let loaded = store.load("abc123").unwrap().unwrap();
        assert_eq!(loaded.white_player, "alice");
        assert_eq!(loaded.history, vec!["e2e4", "c7c5"]);
        assert_eq!(store.count_sessions().unwrap(), 1);
    }

    #[test]
    fn test_sqlite_save_is_an_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&sample("abc123")).unwrap();

        let mut updated = sample("abc123");
        updated.history.push("g1f3".to_string());
        updated.status = "draw".to_string();
        updated.updated_at += 60;
        store.save(&updated).unwrap();

        assert_eq!(store.count_sessions().unwrap(), 1);
        let loaded = store.load("abc123").unwrap().unwrap();
        assert_eq!(loaded.history.len(), 3);
        assert_eq!(loaded.status, "draw");
    }

    #[test]
    fn test_list_orders_by_recency() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut old = sample("older");
        old.updated_at = 100;
        let mut new = sample("newer");
        new.updated_at = 200;
        store.save(&old).unwrap();
        store.save(&new).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, "newer");
        assert_eq!(all[1].session_id, "older");
    }

    #[test]
    fn test_memory_store_behaves_like_sqlite() {
        let store = MemoryStore::new();
        assert!(store.load("missing").unwrap().is_none());
        store.save(&sample("abc123")).unwrap();
        let loaded = store.load("abc123").unwrap().unwrap();
        assert_eq!(loaded.history, vec!["e2e4", "c7c5"]);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
