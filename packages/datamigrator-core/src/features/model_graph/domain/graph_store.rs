// Graph Store
//
// Indexed property graph:
// - vertices: dense Vec, addressed by VertexId
// - index: type name -> entity id -> VertexId
// - edges: dense Vec, addressed by EdgeId
// - adjacency: outgoing/incoming edge lists per vertex
//
// Mutated only by the builder. Consumers get `&GraphStore`.

use ahash::AHashMap;
use datamigrator_source::{EntityId, ModelElement};
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    EdgeExport, EdgeId, GraphExport, GraphStats, ModelEdge, ModelVertex, PendingEdge, VertexExport,
    VertexId, VertexKey,
};
use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::{FieldEdge, GraphContext, MetamodelVertex};
use crate::shared::{intern_str, InternedString};

#[derive(Debug, Default)]
pub struct GraphStore {
    vertices: Vec<ModelVertex>,
    index: AHashMap<InternedString, AHashMap<EntityId, VertexId>>,
    edges: Vec<ModelEdge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            outgoing: Vec::with_capacity(vertices),
            incoming: Vec::with_capacity(vertices),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------
    // Vertices
    // ------------------------------------------------------------

    pub fn reserve_vertices(&mut self, additional: usize) {
        self.vertices.reserve(additional);
        self.outgoing.reserve(additional);
        self.incoming.reserve(additional);
    }

    /// Materialize one entity
    ///
    /// Fails with `DuplicateVertex` when (type_name, id) is already present;
    /// the store is left unchanged in that case.
    pub fn add_vertex(
        &mut self,
        type_name: &str,
        id: EntityId,
        metamodel_vertex: Arc<dyn MetamodelVertex>,
        entity: ModelElement,
        properties: AHashMap<String, serde_json::Value>,
    ) -> Result<VertexId> {
        let type_name = intern_str(type_name);
        let by_id = self.index.entry(Arc::clone(&type_name)).or_default();
        if by_id.contains_key(&id) {
            return Err(ModelGraphError::duplicate_vertex(type_name.as_ref(), id));
        }

        let vertex_id = VertexId(self.vertices.len());
        by_id.insert(id.clone(), vertex_id);
        self.vertices.push(ModelVertex {
            id: vertex_id,
            key: VertexKey::new(type_name, id),
            metamodel_vertex,
            entity,
            properties,
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(vertex_id)
    }

    /// Lookup by identity; `None` for unknown keys
    pub fn get_vertex(&self, type_name: &str, id: &EntityId) -> Option<&ModelVertex> {
        self.index
            .get(type_name)
            .and_then(|by_id| by_id.get(id))
            .map(|vid| &self.vertices[vid.0])
    }

    pub fn vertex(&self, id: VertexId) -> Option<&ModelVertex> {
        self.vertices.get(id.0)
    }

    /// Every vertex; call again to restart
    pub fn all_vertices(&self) -> std::slice::Iter<'_, ModelVertex> {
        self.vertices.iter()
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn vertices_of_type<'a>(
        &'a self,
        type_name: &str,
    ) -> impl Iterator<Item = &'a ModelVertex> + 'a {
        self.index
            .get(type_name)
            .into_iter()
            .flat_map(|by_id| by_id.values())
            .map(move |vid| &self.vertices[vid.0])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    // ------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------

    /// Append an edge named after `field_edge`
    ///
    /// No uniqueness check. Both endpoints must already be in the store.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        field_edge: Arc<FieldEdge>,
    ) -> Result<EdgeId> {
        if source.0 >= self.vertices.len() || target.0 >= self.vertices.len() {
            return Err(ModelGraphError::config(format!(
                "edge {} references a vertex outside the store ({:?} -> {:?})",
                field_edge, source, target
            )));
        }

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(ModelEdge {
            id: edge_id,
            source,
            target,
            field_edge,
        });
        self.outgoing[source.0].push(edge_id);
        self.incoming[target.0].push(edge_id);
        Ok(edge_id)
    }

    /// Merge edges accumulated by a resolution pass; returns how many were added
    pub fn extend_edges(&mut self, pending: impl IntoIterator<Item = PendingEdge>) -> Result<usize> {
        let pending = pending.into_iter();
        self.edges.reserve(pending.size_hint().0);

        let mut added = 0;
        for edge in pending {
            self.add_edge(edge.source, edge.target, edge.field_edge)?;
            added += 1;
        }
        Ok(added)
    }

    /// Edges whose source is `vertex`
    pub fn outbound_edges(&self, vertex: VertexId) -> impl Iterator<Item = &ModelEdge> + '_ {
        self.outgoing
            .get(vertex.0)
            .into_iter()
            .flatten()
            .map(move |eid| &self.edges[eid.0])
    }

    /// Edges whose target is `vertex`
    pub fn incoming_edges(&self, vertex: VertexId) -> impl Iterator<Item = &ModelEdge> + '_ {
        self.incoming
            .get(vertex.0)
            .into_iter()
            .flatten()
            .map(move |eid| &self.edges[eid.0])
    }

    pub fn edges(&self) -> std::slice::Iter<'_, ModelEdge> {
        self.edges.iter()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ------------------------------------------------------------
    // Summaries
    // ------------------------------------------------------------

    pub fn stats(&self) -> GraphStats {
        let mut vertices_by_type: HashMap<String, usize> = HashMap::new();
        for (type_name, by_id) in &self.index {
            vertices_by_type.insert(type_name.to_string(), by_id.len());
        }

        let mut edges_by_field: HashMap<String, usize> = HashMap::new();
        for edge in &self.edges {
            let key = format!("{}.{}", edge.field_edge.source_type(), edge.field_name());
            *edges_by_field.entry(key).or_insert(0) += 1;
        }

        GraphStats {
            total_vertices: self.vertices.len(),
            total_edges: self.edges.len(),
            vertices_by_type,
            edges_by_field,
        }
    }

    /// Owned, identity-sorted copy of the graph
    pub fn export(&self) -> GraphExport {
        let mut vertices: Vec<VertexExport> = self
            .vertices
            .iter()
            .map(|v| VertexExport {
                key: v.key.clone(),
                properties: v
                    .properties
                    .iter()
                    .map(|(k, val)| (k.clone(), val.clone()))
                    .collect(),
            })
            .collect();
        vertices.sort_by(|a, b| a.key.cmp(&b.key));

        let mut edges: Vec<EdgeExport> = self
            .edges
            .iter()
            .map(|e| EdgeExport {
                source: self.vertices[e.source.0].key.clone(),
                target: self.vertices[e.target.0].key.clone(),
                field_name: e.field_name().to_string(),
            })
            .collect();
        edges.sort();

        GraphExport { vertices, edges }
    }
}

impl GraphContext for GraphStore {
    fn contains_vertex(&self, type_name: &str, id: &EntityId) -> bool {
        self.get_vertex(type_name, id).is_some()
    }

    fn vertex_entity(&self, type_name: &str, id: &EntityId) -> Option<&ModelElement> {
        self.get_vertex(type_name, id).map(|v| v.entity())
    }
}
