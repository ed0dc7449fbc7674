// Model Graph Domain Models
//
// Materialized vertices and edges, the build report, and the graph
// summaries handed to downstream migration stages.

pub mod graph_store;

use ahash::AHashMap;
use datamigrator_source::{EntityId, ModelElement};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::features::metamodel::{FieldEdge, Metamodel, MetamodelVertex};
use crate::shared::interner::{deserialize_arc_str, serialize_arc_str};
use crate::shared::InternedString;

pub use graph_store::GraphStore;

// ============================================================
// Identifiers
// ============================================================

/// Dense index of a vertex inside its `GraphStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Dense index of an edge inside its `GraphStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity of a vertex: (type name, entity id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexKey {
    #[serde(
        serialize_with = "serialize_arc_str",
        deserialize_with = "deserialize_arc_str"
    )]
    pub type_name: InternedString,
    pub id: EntityId,
}

impl VertexKey {
    pub fn new(type_name: InternedString, id: EntityId) -> Self {
        Self { type_name, id }
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.id)
    }
}

// ============================================================
// Vertices and Edges
// ============================================================

/// One imported entity, created exactly once per (type, id)
#[derive(Debug, Clone)]
pub struct ModelVertex {
    pub(crate) id: VertexId,
    pub(crate) key: VertexKey,
    pub(crate) metamodel_vertex: Arc<dyn MetamodelVertex>,
    pub(crate) entity: ModelElement,
    pub(crate) properties: AHashMap<String, serde_json::Value>,
}

impl ModelVertex {
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &VertexKey {
        &self.key
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.key.type_name
    }

    #[inline]
    pub fn entity_id(&self) -> &EntityId {
        &self.key.id
    }

    pub fn metamodel_vertex(&self) -> &Arc<dyn MetamodelVertex> {
        &self.metamodel_vertex
    }

    /// Raw payload as imported
    pub fn entity(&self) -> &ModelElement {
        &self.entity
    }

    pub fn properties(&self) -> &AHashMap<String, serde_json::Value> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }
}

/// One resolved relationship occurrence
#[derive(Debug, Clone)]
pub struct ModelEdge {
    pub(crate) id: EdgeId,
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    pub(crate) field_edge: Arc<FieldEdge>,
}

impl ModelEdge {
    #[inline]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    #[inline]
    pub fn source(&self) -> VertexId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> VertexId {
        self.target
    }

    #[inline]
    pub fn field_name(&self) -> &str {
        self.field_edge.field_name()
    }

    /// Field descriptor this edge was resolved from
    pub fn field_edge(&self) -> &Arc<FieldEdge> {
        &self.field_edge
    }
}

/// Edge computed during resolution, not yet inserted
#[derive(Debug, Clone)]
pub struct PendingEdge {
    pub source: VertexId,
    pub target: VertexId,
    pub field_edge: Arc<FieldEdge>,
}

// ============================================================
// Build Result
// ============================================================

/// Tolerated gaps met during edge resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// (vertex, field) pairs whose relationship evaluated to nothing
    pub unset_fields: usize,
    /// Related entities without a resolvable id
    pub unresolvable_ids: usize,
    /// Related ids with no matching vertex
    pub dangling_references: usize,
    /// Same target repeated within one (vertex, field)
    pub repeated_references: usize,
}

impl SkipCounts {
    pub fn merge(&mut self, other: &SkipCounts) {
        self.unset_fields += other.unset_fields;
        self.unresolvable_ids += other.unresolvable_ids;
        self.dangling_references += other.dangling_references;
        self.repeated_references += other.repeated_references;
    }

    /// Related entities that produced no edge
    pub fn skipped_references(&self) -> usize {
        self.unresolvable_ids + self.dangling_references + self.repeated_references
    }
}

/// Summary of one successful build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub snapshot_id: u64,
    pub vertex_types: usize,
    pub vertices: usize,
    pub edges: usize,
    pub skipped: SkipCounts,
    pub workers: usize,
    pub vertex_phase: Duration,
    pub edge_phase: Duration,
}

impl BuildReport {
    pub fn total_duration(&self) -> Duration {
        self.vertex_phase + self.edge_phase
    }
}

/// Build output: the populated store plus its schema
#[derive(Debug)]
pub struct ModelGraph {
    store: GraphStore,
    metamodel: Arc<Metamodel>,
    report: BuildReport,
}

impl ModelGraph {
    pub(crate) fn new(store: GraphStore, metamodel: Arc<Metamodel>, report: BuildReport) -> Self {
        Self {
            store,
            metamodel,
            report,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn metamodel(&self) -> &Arc<Metamodel> {
        &self.metamodel
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn into_parts(self) -> (GraphStore, Arc<Metamodel>, BuildReport) {
        (self.store, self.metamodel, self.report)
    }
}

// ============================================================
// Summaries
// ============================================================

/// Graph statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_vertices: usize,
    pub total_edges: usize,
    pub vertices_by_type: HashMap<String, usize>,
    /// Keyed by `Type.field`
    pub edges_by_field: HashMap<String, usize>,
}

/// Serializable copy of the graph, sorted by identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub vertices: Vec<VertexExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexExport {
    #[serde(flatten)]
    pub key: VertexKey,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: VertexKey,
    pub target: VertexKey,
    pub field_name: String,
}
