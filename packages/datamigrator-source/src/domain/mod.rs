//! Domain layer for the migration source store
//!
//! # Domain Models
//!
//! - `ModelElement`: one raw entity read from the source store
//! - `EntityId`: identifier value extracted from an entity
//! - `SnapshotInfo`: metadata about an acquired read snapshot
//!
//! # Port Traits
//!
//! - `SourceStore`: hands out read-only snapshots
//! - `SourceSnapshot`: repeatable reads of entities, released on drop
//!
//! # Examples
//!
//! ```rust,ignore
//! use datamigrator_source::{SourceStore, SourceSnapshot};
//!
//! fn count_orders(store: &dyn SourceStore) -> datamigrator_source::Result<usize> {
//!     let snapshot = store.open_snapshot()?;
//!     let orders = snapshot.entities_of("Order")?;
//!     Ok(orders.len())
//!     // snapshot released here
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::{Result, SourceError};

// ═══════════════════════════════════════════════════════════════════════════
// Entity Identity
// ═══════════════════════════════════════════════════════════════════════════

/// Identifier of an entity within its type
///
/// Only integral numbers and strings are identities. Every other JSON
/// value (null, floats, booleans, objects, arrays) is unresolvable.
///
/// Integers that fit `i64` are always `Int`; `UInt` only holds values above
/// `i64::MAX`, so one number has exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Int(i64),
    UInt(u64),
    Text(Arc<str>),
}

impl EntityId {
    /// Read an identifier from a JSON scalar
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(EntityId::Int)
                .or_else(|| n.as_u64().map(EntityId::UInt)),
            Value::String(s) => Some(EntityId::Text(Arc::from(s.as_str()))),
            _ => None,
        }
    }

    /// Convert back into a JSON scalar
    pub fn to_json(&self) -> Value {
        match self {
            EntityId::Int(n) => Value::from(*n),
            EntityId::UInt(n) => Value::from(*n),
            EntityId::Text(s) => Value::from(s.as_ref()),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Int(n)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(EntityId::UInt(n), EntityId::Int)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(Arc::from(s))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => write!(f, "{}", n),
            EntityId::UInt(n) => write!(f, "{}", n),
            EntityId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EntityId::Int(n) => serializer.serialize_i64(*n),
            EntityId::UInt(n) => serializer.serialize_u64(*n),
            EntityId::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            UInt(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EntityId::Int(n),
            RawId::UInt(n) => EntityId::from(n),
            RawId::Text(s) => EntityId::Text(Arc::from(s.as_str())),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Entity Payload
// ═══════════════════════════════════════════════════════════════════════════

/// Raw entity as read from the source store
///
/// The payload is a JSON object. Relationship fields hold either scalar
/// references (the related entity's id) or embedded related entities.
///
/// # Examples
///
/// ```rust
/// use datamigrator_source::ModelElement;
/// use serde_json::json;
///
/// let order = ModelElement::from_json("Order", json!({"id": 10, "customer": 1})).unwrap();
/// assert_eq!(order.type_name(), "Order");
/// assert_eq!(order.field("customer"), Some(&json!(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    type_name: String,
    fields: Map<String, Value>,
}

impl ModelElement {
    pub fn new(type_name: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Build an element from a JSON value, which must be an object
    pub fn from_json(type_name: impl Into<String>, value: Value) -> Result<Self> {
        let type_name = type_name.into();
        match value {
            Value::Object(fields) => Ok(Self::new(type_name, fields)),
            other => Err(SourceError::serialization(format!(
                "Entity of type '{}' must be a JSON object, got: {}",
                type_name, other
            ))),
        }
    }

    /// Stub element carrying only an identifier field
    pub fn reference(type_name: impl Into<String>, id_field: &str, id: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(id_field.to_string(), id);
        Self::new(type_name, fields)
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[inline]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Snapshot Ports
// ═══════════════════════════════════════════════════════════════════════════

/// Metadata of an acquired snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// Per-store sequence number
    pub id: u64,
    /// Human-readable store description (e.g. `sqlite:/data/source.db`)
    pub source: String,
    pub acquired_at: DateTime<Utc>,
}

impl SnapshotInfo {
    pub fn new(id: u64, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            acquired_at: Utc::now(),
        }
    }
}

/// Read-only, repeatable-read view of a source store
///
/// Everything read through one snapshot reflects the same point in time.
/// Dropping the snapshot releases it; implementations must release on drop
/// whether the reader finished normally or bailed out with an error.
pub trait SourceSnapshot: Send + Sync {
    fn info(&self) -> &SnapshotInfo;

    /// All entities of one type, in source order
    fn entities_of(&self, type_name: &str) -> Result<Vec<ModelElement>>;
}

/// Store that hands out read-only snapshots
pub trait SourceStore: Send + Sync {
    fn open_snapshot(&self) -> Result<Box<dyn SourceSnapshot>>;
}
