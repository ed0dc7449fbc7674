// Phase 1 - Vertex Materialization
//
// Import (parallel per type, one shared snapshot) -> extract id/properties
// (parallel) -> insert into the store (sequential, metamodel order).
//
// Insertion is sequential so a duplicate id is reported for the same entity
// on every run.

use ahash::AHashMap;
use datamigrator_source::{EntityId, ModelElement, SourceSnapshot};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::{Metamodel, MetamodelVertex};
use crate::features::model_graph::domain::GraphStore;
use crate::features::model_graph::ports::EntityImporter;

/// Entity ready to become a vertex
struct ExtractedEntity {
    id: EntityId,
    properties: AHashMap<String, serde_json::Value>,
    entity: ModelElement,
}

/// All entities of one type, extracted
struct ImportedType {
    vertex: Arc<dyn MetamodelVertex>,
    entities: Vec<ExtractedEntity>,
}

pub struct VertexMaterializer<'a> {
    importer: &'a dyn EntityImporter,
}

impl<'a> VertexMaterializer<'a> {
    pub fn new(importer: &'a dyn EntityImporter) -> Self {
        Self { importer }
    }

    /// Fill `store` with one vertex per imported entity; returns the vertex count
    pub fn materialize(
        &self,
        metamodel: &Metamodel,
        snapshot: &dyn SourceSnapshot,
        store: &mut GraphStore,
    ) -> Result<usize> {
        let types: Vec<&Arc<dyn MetamodelVertex>> = metamodel.vertices().collect();

        let imported: Vec<ImportedType> = types
            .par_iter()
            .map(|vertex| self.import_type(vertex, snapshot))
            .collect::<Result<Vec<_>>>()?;

        let total: usize = imported.iter().map(|t| t.entities.len()).sum();
        store.reserve_vertices(total);

        for imported_type in imported {
            let type_name = imported_type.vertex.type_name();
            for extracted in imported_type.entities {
                debug!("vertex {}:{}", type_name, extracted.id);
                store.add_vertex(
                    type_name,
                    extracted.id,
                    Arc::clone(&imported_type.vertex),
                    extracted.entity,
                    extracted.properties,
                )?;
            }
        }

        Ok(store.vertex_count())
    }

    fn import_type(
        &self,
        vertex: &Arc<dyn MetamodelVertex>,
        snapshot: &dyn SourceSnapshot,
    ) -> Result<ImportedType> {
        let raw = self
            .importer
            .import_entities(snapshot, vertex.as_ref(), Vec::new())?;

        let entities = raw
            .into_par_iter()
            .map(|entity| -> Result<ExtractedEntity> {
                let id = vertex.entity_id(&entity).ok_or_else(|| {
                    ModelGraphError::config(format!(
                        "entity of type '{}' has no resolvable identifier: {}",
                        vertex.type_name(),
                        serde_json::Value::Object(entity.fields().clone())
                    ))
                })?;
                let properties = vertex.additional_properties(&entity);
                Ok(ExtractedEntity {
                    id,
                    properties,
                    entity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ImportedType {
            vertex: Arc::clone(vertex),
            entities,
        })
    }
}
