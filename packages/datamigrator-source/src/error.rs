//! Error types for datamigrator-source

use std::fmt;
use thiserror::Error;

/// Source error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Database errors (SQLite, ...)
    Database,
    /// Payload serialization/deserialization errors
    Serialization,
    /// Source store unreachable
    Connection,
    /// Store locked by another connection (SQLITE_BUSY / SQLITE_LOCKED)
    Busy,
    /// Snapshot was released or lost while still in use
    SnapshotClosed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Connection => "connection",
            ErrorKind::Busy => "busy",
            ErrorKind::SnapshotClosed => "snapshot_closed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source store error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct SourceError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn snapshot_closed(snapshot_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::SnapshotClosed,
            format!("Snapshot is no longer readable: {}", snapshot_id),
        )
    }

    /// Whether retrying the whole read may succeed.
    ///
    /// Database errors other than busy/locked (missing table, constraint,
    /// corrupt file) and serialization errors fail again on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Connection | ErrorKind::Busy | ErrorKind::SnapshotClosed
        )
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        let kind = match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                ErrorKind::Busy
            }
            _ => ErrorKind::Database,
        };
        SourceError::new(kind, format!("SQLite error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SourceError>;
