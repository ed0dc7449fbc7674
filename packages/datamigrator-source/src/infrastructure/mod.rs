//! Infrastructure layer - Source store adapters

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemorySourceStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSourceStore;
