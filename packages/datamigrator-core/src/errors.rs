//! Error types for datamigrator-core
//!
//! Every variant is fatal to the build that raised it. Conditions the
//! builder tolerates (unset relationship, unresolvable related id, dangling
//! reference) are never represented here.

use datamigrator_source::{EntityId, SourceError};
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for model graph construction
#[derive(Debug, Error)]
pub enum ModelGraphError {
    /// Malformed metamodel, bad configuration, or a primary entity without identity
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two entities of one type resolved to the same identifier
    #[error("Duplicate vertex: {type_name} with id {id} was imported more than once")]
    DuplicateVertex { type_name: String, id: EntityId },

    /// Source store unreachable or snapshot lost
    #[error("Source I/O error: {0}")]
    SourceIo(#[from] SourceError),
}

/// Flat error classification for pipeline-level decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DuplicateVertex,
    SourceIo,
}

impl ModelGraphError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ModelGraphError::Configuration(msg.into())
    }

    pub fn duplicate_vertex(type_name: impl Into<String>, id: EntityId) -> Self {
        ModelGraphError::DuplicateVertex {
            type_name: type_name.into(),
            id,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelGraphError::Configuration(_) => ErrorKind::Configuration,
            ModelGraphError::DuplicateVertex { .. } => ErrorKind::DuplicateVertex,
            ModelGraphError::SourceIo(_) => ErrorKind::SourceIo,
        }
    }

    /// Whether rebuilding from scratch could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelGraphError::SourceIo(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<ConfigError> for ModelGraphError {
    fn from(err: ConfigError) -> Self {
        ModelGraphError::Configuration(err.to_string())
    }
}

/// Result type alias for model graph operations
pub type Result<T> = std::result::Result<T, ModelGraphError>;
