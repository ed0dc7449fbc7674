// Phase 2 - Edge Resolution
//
// Per vertex (parallel, read-only on the store):
//   for each outbound field edge f
//     evaluate f -> normalize to zero or more related entities
//     for each related entity r
//       id(r) via the target type   (None -> skip)
//       lookup (target type, id)    (absent -> skip)
//       emit PendingEdge
//
// Pending edges are merged into the store by the caller once every vertex
// has been processed.

use ahash::AHashSet;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::{FieldEdge, Metamodel};
use crate::features::model_graph::domain::{
    GraphStore, ModelVertex, PendingEdge, SkipCounts, VertexId,
};

/// Edges and skip counters of one resolution pass
#[derive(Debug, Default)]
pub struct Resolution {
    pub edges: Vec<PendingEdge>,
    pub skipped: SkipCounts,
}

impl Resolution {
    fn merge(mut self, other: Resolution) -> Resolution {
        self.edges.extend(other.edges);
        self.skipped.merge(&other.skipped);
        self
    }
}

pub struct EdgeResolver<'a> {
    metamodel: &'a Metamodel,
    log_skipped: bool,
}

impl<'a> EdgeResolver<'a> {
    pub fn new(metamodel: &'a Metamodel) -> Self {
        Self {
            metamodel,
            log_skipped: true,
        }
    }

    pub fn log_skipped(mut self, enabled: bool) -> Self {
        self.log_skipped = enabled;
        self
    }

    /// Compute every edge of `store` without mutating it
    ///
    /// Output order follows vertex order, then field declaration order, then
    /// the order the evaluator returned related entities in.
    pub fn resolve(&self, store: &GraphStore) -> Result<Resolution> {
        let per_vertex = store
            .vertices()
            .par_iter()
            .map(|vertex| self.resolve_vertex(vertex, store))
            .collect::<Result<Vec<_>>>()?;

        Ok(per_vertex
            .into_iter()
            .fold(Resolution::default(), Resolution::merge))
    }

    fn resolve_vertex(&self, vertex: &ModelVertex, store: &GraphStore) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let field_edges = vertex.metamodel_vertex().outbound_field_edges(self.metamodel);
        debug!(
            "resolving {} field(s) of {}",
            field_edges.len(),
            vertex.key()
        );

        for field_edge in field_edges {
            self.resolve_field(vertex, field_edge, store, &mut resolution)?;
        }
        Ok(resolution)
    }

    fn resolve_field(
        &self,
        vertex: &ModelVertex,
        field_edge: &Arc<FieldEdge>,
        store: &GraphStore,
        out: &mut Resolution,
    ) -> Result<()> {
        let target_type = self.metamodel.vertex(field_edge.target_type()).ok_or_else(|| {
            ModelGraphError::config(format!(
                "field edge {} targets a type missing from the metamodel",
                field_edge
            ))
        })?;

        let value = field_edge.evaluate(vertex.entity(), store);
        if value.is_unset() {
            out.skipped.unset_fields += 1;
            return Ok(());
        }

        let mut targets: AHashSet<VertexId> = AHashSet::new();
        for related in field_edge.normalize(value)? {
            let Some(id) = target_type.entity_id(&related) else {
                out.skipped.unresolvable_ids += 1;
                if self.log_skipped {
                    debug!(
                        "skip {}.{}: related {} has no resolvable id",
                        vertex.key(),
                        field_edge.field_name(),
                        field_edge.target_type()
                    );
                }
                continue;
            };

            let Some(target) = store.get_vertex(field_edge.target_type(), &id) else {
                out.skipped.dangling_references += 1;
                if self.log_skipped {
                    debug!(
                        "skip {}.{}: {}:{} was not imported",
                        vertex.key(),
                        field_edge.field_name(),
                        field_edge.target_type(),
                        id
                    );
                }
                continue;
            };

            if !targets.insert(target.id()) {
                out.skipped.repeated_references += 1;
                continue;
            }

            out.edges.push(PendingEdge {
                source: vertex.id(),
                target: target.id(),
                field_edge: Arc::clone(field_edge),
            });
        }
        Ok(())
    }
}
