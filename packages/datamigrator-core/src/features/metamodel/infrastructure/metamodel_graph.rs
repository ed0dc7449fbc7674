// Metamodel Graph
//
// Entity types as nodes, relationship fields as directed edges
// (source type -> target type). Built once, read-only afterwards.

use ahash::{AHashMap, AHashSet};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::sync::Arc;

use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::domain::{FieldEdge, MetamodelVertex};
use crate::shared::{intern_str, InternedString};

/// Validated schema of the source data model
#[derive(Debug)]
pub struct Metamodel {
    graph: DiGraph<Arc<dyn MetamodelVertex>, Arc<FieldEdge>>,
    by_name: AHashMap<InternedString, NodeIndex>,
}

impl Metamodel {
    pub fn builder() -> MetamodelBuilder {
        MetamodelBuilder::default()
    }

    /// All vertex types, in declaration order
    pub fn vertices(&self) -> impl Iterator<Item = &Arc<dyn MetamodelVertex>> + '_ {
        self.graph.node_weights()
    }

    pub fn vertex(&self, type_name: &str) -> Option<&Arc<dyn MetamodelVertex>> {
        self.by_name
            .get(type_name)
            .map(|idx| &self.graph[*idx])
    }

    /// Relationship fields declared on `type_name` (empty for unknown types)
    pub fn outbound_field_edges(&self, type_name: &str) -> Vec<&Arc<FieldEdge>> {
        match self.by_name.get(type_name) {
            Some(idx) => self
                .graph
                .edges_directed(*idx, Direction::Outgoing)
                .map(|e| e.weight())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Relationship fields pointing at `type_name`
    pub fn inbound_field_edges(&self, type_name: &str) -> Vec<&Arc<FieldEdge>> {
        match self.by_name.get(type_name) {
            Some(idx) => self
                .graph
                .edges_directed(*idx, Direction::Incoming)
                .map(|e| e.weight())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn field_edges(&self) -> impl Iterator<Item = &Arc<FieldEdge>> + '_ {
        self.graph.edge_weights()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn field_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Type-level graph for downstream ordering stages
    pub fn schema_graph(&self) -> &DiGraph<Arc<dyn MetamodelVertex>, Arc<FieldEdge>> {
        &self.graph
    }
}

/// Collects vertex types and field edges, validating on `build()`
#[derive(Default)]
pub struct MetamodelBuilder {
    vertices: Vec<Arc<dyn MetamodelVertex>>,
    field_edges: Vec<FieldEdge>,
}

impl MetamodelBuilder {
    pub fn vertex(self, vertex: impl MetamodelVertex + 'static) -> Self {
        self.shared_vertex(Arc::new(vertex))
    }

    pub fn shared_vertex(mut self, vertex: Arc<dyn MetamodelVertex>) -> Self {
        self.vertices.push(vertex);
        self
    }

    pub fn field_edge(mut self, edge: FieldEdge) -> Self {
        self.field_edges.push(edge);
        self
    }

    /// Validate and freeze
    ///
    /// Fails with a configuration error on empty or duplicate type names,
    /// on field edges whose source or target type is not declared, and on a
    /// field name declared twice for the same source type.
    pub fn build(self) -> Result<Metamodel> {
        let mut graph = DiGraph::with_capacity(self.vertices.len(), self.field_edges.len());
        let mut by_name: AHashMap<InternedString, NodeIndex> = AHashMap::new();

        for vertex in self.vertices {
            let name = vertex.type_name();
            if name.is_empty() {
                return Err(ModelGraphError::config("metamodel vertex with empty type name"));
            }
            if by_name.contains_key(name) {
                return Err(ModelGraphError::config(format!(
                    "metamodel type '{}' is declared more than once",
                    name
                )));
            }
            let name = intern_str(name);
            let idx = graph.add_node(vertex);
            by_name.insert(name, idx);
        }

        let mut seen_fields: AHashSet<(InternedString, InternedString)> = AHashSet::new();
        for edge in self.field_edges {
            let source = *by_name.get(edge.source_type()).ok_or_else(|| {
                ModelGraphError::config(format!(
                    "field edge {} references undeclared source type '{}'",
                    edge,
                    edge.source_type()
                ))
            })?;
            let target = *by_name.get(edge.target_type()).ok_or_else(|| {
                ModelGraphError::config(format!(
                    "field edge {} references undeclared target type '{}'",
                    edge,
                    edge.target_type()
                ))
            })?;
            if !seen_fields.insert((
                intern_str(edge.source_type()),
                Arc::clone(edge.interned_field_name()),
            )) {
                return Err(ModelGraphError::config(format!(
                    "field '{}' is declared more than once on type '{}'",
                    edge.field_name(),
                    edge.source_type()
                )));
            }
            graph.add_edge(source, target, Arc::new(edge));
        }

        Ok(Metamodel { graph, by_name })
    }
}
