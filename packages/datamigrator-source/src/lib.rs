//! Migration source store
//!
//! Read side of a data migration: raw entities as they sit in the source
//! datastore, and the snapshot boundary every read goes through.
//!
//! ## Core Principles
//!
//! 1. **Snapshot Reads**: every read happens inside a `SourceSnapshot`, which
//!    pins one consistent point in time of the source
//! 2. **Scoped Release**: a snapshot is released when it is dropped, on the
//!    happy path and on every early return
//! 3. **Read Only**: nothing in this crate writes through a snapshot
//!
//! ## Usage
//!
//! ```rust
//! use datamigrator_source::{InMemorySourceStore, ModelElement, SourceStore};
//! use serde_json::json;
//!
//! let store = InMemorySourceStore::new();
//! store.insert(ModelElement::from_json("Customer", json!({"id": 1})).unwrap());
//!
//! let snapshot = store.open_snapshot().unwrap();
//! assert_eq!(snapshot.entities_of("Customer").unwrap().len(), 1);
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, SourceError};

pub use domain::{EntityId, ModelElement, SnapshotInfo, SourceSnapshot, SourceStore};

pub use infrastructure::InMemorySourceStore;

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteSourceStore;
