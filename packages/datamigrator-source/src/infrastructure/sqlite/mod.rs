//! SQLite adapter for SourceStore
//!
//! Entities live as JSON documents in a single `entities` table keyed by
//! type name. The database runs in WAL mode so a snapshot (a read
//! transaction on its own read-only connection) never blocks writers and
//! never sees their later commits.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::domain::{ModelElement, SnapshotInfo, SourceSnapshot, SourceStore};
use crate::{Result, SourceError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entities (
        seq       INTEGER PRIMARY KEY AUTOINCREMENT,
        type_name TEXT NOT NULL,
        payload   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_entities_type ON entities(type_name);
";

/// Source store backed by a SQLite file
pub struct SqliteSourceStore {
    path: PathBuf,
    writer: Mutex<Connection>,
    next_snapshot_id: AtomicU64,
}

impl SqliteSourceStore {
    /// Open (or create) a source database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;

        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(SourceError::database(format!(
                "SQLite source at {} refused WAL mode (got '{}')",
                path.display(),
                mode
            )));
        }
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path,
            writer: Mutex::new(conn),
            next_snapshot_id: AtomicU64::new(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn insert(&self, element: &ModelElement) -> Result<()> {
        let payload = serde_json::to_string(element.fields())?;
        self.writer.lock().execute(
            "INSERT INTO entities (type_name, payload) VALUES (?1, ?2)",
            params![element.type_name(), payload],
        )?;
        Ok(())
    }

    /// Insert all elements in one transaction
    pub fn insert_many<'a>(&self, elements: impl IntoIterator<Item = &'a ModelElement>) -> Result<usize> {
        let mut conn = self.writer.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO entities (type_name, payload) VALUES (?1, ?2)")?;
            for element in elements {
                let payload = serde_json::to_string(element.fields())?;
                stmt.execute(params![element.type_name(), payload])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Delete every entity of a type, returning the number of rows removed
    pub fn delete_type(&self, type_name: &str) -> Result<usize> {
        let removed = self
            .writer
            .lock()
            .execute("DELETE FROM entities WHERE type_name = ?1", params![type_name])?;
        Ok(removed)
    }
}

impl SqliteSourceStore {
    fn open_read_snapshot(&self) -> Result<SqliteSnapshot> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            SourceError::connection(format!("cannot open {}", self.path.display())).with_source(e)
        })?;

        // A deferred transaction takes its read mark on the first SELECT; do
        // that now so the snapshot point is the moment of acquisition.
        conn.execute_batch("BEGIN DEFERRED")?;
        conn.query_row("SELECT count(*) FROM entities", [], |row| row.get::<_, i64>(0))?;

        let id = self.next_snapshot_id.fetch_add(1, Ordering::SeqCst);
        debug!("sqlite snapshot {} acquired on {}", id, self.path.display());

        Ok(SqliteSnapshot {
            info: SnapshotInfo::new(id, format!("sqlite:{}", self.path.display())),
            conn: Mutex::new(conn),
        })
    }
}

impl SourceStore for SqliteSourceStore {
    fn open_snapshot(&self) -> Result<Box<dyn SourceSnapshot>> {
        Ok(Box::new(self.open_read_snapshot()?))
    }
}

struct SqliteSnapshot {
    info: SnapshotInfo,
    conn: Mutex<Connection>,
}

impl SourceSnapshot for SqliteSnapshot {
    fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    fn entities_of(&self, type_name: &str) -> Result<Vec<ModelElement>> {
        let conn = self.conn.lock();
        // Back in autocommit mode means the read transaction ended and the
        // snapshot point is gone.
        if conn.is_autocommit() {
            return Err(SourceError::snapshot_closed(self.info.id));
        }
        let mut stmt =
            conn.prepare_cached("SELECT payload FROM entities WHERE type_name = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![type_name], |row| row.get::<_, String>(0))?;

        let mut elements = Vec::new();
        for payload in rows {
            let fields: Map<String, Value> = serde_json::from_str(&payload?)?;
            elements.push(ModelElement::new(type_name, fields));
        }
        Ok(elements)
    }
}

impl Drop for SqliteSnapshot {
    fn drop(&mut self) {
        let conn = self.conn.get_mut();
        if conn.is_autocommit() {
            debug!("sqlite snapshot {} already closed", self.info.id);
            return;
        }
        if let Err(e) = conn.execute_batch("ROLLBACK") {
            warn!("sqlite snapshot {} release failed: {}", self.info.id, e);
        } else {
            debug!("sqlite snapshot {} released", self.info.id);
        }
    }
}
