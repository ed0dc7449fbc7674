//! In-memory source store
//!
//! Copy-on-write entity tables. A snapshot pins the table version that was
//! current when it was opened; writes after that produce a new version and
//! never show up in the pinned one.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{ModelElement, SnapshotInfo, SourceSnapshot, SourceStore};
use crate::{Result, SourceError};

type EntityTables = HashMap<String, Vec<ModelElement>>;

/// Source store held entirely in memory
#[derive(Debug)]
pub struct InMemorySourceStore {
    tables: RwLock<Arc<EntityTables>>,
    connected: Arc<AtomicBool>,
    active_snapshots: Arc<AtomicUsize>,
    next_snapshot_id: AtomicU64,
}

impl InMemorySourceStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Arc::new(EntityTables::new())),
            connected: Arc::new(AtomicBool::new(true)),
            active_snapshots: Arc::new(AtomicUsize::new(0)),
            next_snapshot_id: AtomicU64::new(1),
        }
    }

    /// Append one entity to its type's table
    pub fn insert(&self, element: ModelElement) {
        let mut tables = self.tables.write();
        Arc::make_mut(&mut tables)
            .entry(element.type_name().to_string())
            .or_default()
            .push(element);
    }

    pub fn insert_many(&self, elements: impl IntoIterator<Item = ModelElement>) {
        let mut tables = self.tables.write();
        let tables = Arc::make_mut(&mut tables);
        for element in elements {
            tables
                .entry(element.type_name().to_string())
                .or_default()
                .push(element);
        }
    }

    /// Remove every entity of `type_name` matching `predicate`, returning how many went
    pub fn remove_where(
        &self,
        type_name: &str,
        mut predicate: impl FnMut(&ModelElement) -> bool,
    ) -> usize {
        let mut tables = self.tables.write();
        match Arc::make_mut(&mut tables).get_mut(type_name) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|e| !predicate(e));
                before - rows.len()
            }
            None => 0,
        }
    }

    /// Simulate losing connectivity; open snapshots fail on their next read
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Number of snapshots opened and not yet released
    pub fn active_snapshots(&self) -> usize {
        self.active_snapshots.load(Ordering::SeqCst)
    }
}

impl Default for InMemorySourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceStore for InMemorySourceStore {
    fn open_snapshot(&self) -> Result<Box<dyn SourceSnapshot>> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(SourceError::connection("in-memory source is disconnected"));
        }

        let id = self.next_snapshot_id.fetch_add(1, Ordering::SeqCst);
        let tables = Arc::clone(&self.tables.read());
        self.active_snapshots.fetch_add(1, Ordering::SeqCst);
        debug!("memory snapshot {} acquired", id);

        Ok(Box::new(MemorySnapshot {
            info: SnapshotInfo::new(id, "memory"),
            tables,
            connected: Arc::clone(&self.connected),
            active_snapshots: Arc::clone(&self.active_snapshots),
        }))
    }
}

struct MemorySnapshot {
    info: SnapshotInfo,
    tables: Arc<EntityTables>,
    connected: Arc<AtomicBool>,
    active_snapshots: Arc<AtomicUsize>,
}

impl SourceSnapshot for MemorySnapshot {
    fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    fn entities_of(&self, type_name: &str) -> Result<Vec<ModelElement>> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(SourceError::connection(format!(
                "lost connection while reading '{}' in snapshot {}",
                type_name, self.info.id
            )));
        }
        Ok(self.tables.get(type_name).cloned().unwrap_or_default())
    }
}

impl Drop for MemorySnapshot {
    fn drop(&mut self) {
        self.active_snapshots.fetch_sub(1, Ordering::SeqCst);
        debug!("memory snapshot {} released", self.info.id);
    }
}
