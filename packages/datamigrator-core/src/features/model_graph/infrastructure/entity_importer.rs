// Snapshot Entity Importer
//
// Default importer: reads `entities_of(type)` from the snapshot, optionally
// narrowed by a per-type filter (e.g. migrate only a tenant's rows).

use ahash::AHashMap;
use datamigrator_source::{ModelElement, SourceSnapshot};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::features::metamodel::MetamodelVertex;
use crate::features::model_graph::ports::EntityImporter;

type EntityFilter = Arc<dyn Fn(&ModelElement) -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub struct SnapshotEntityImporter {
    filters: AHashMap<String, EntityFilter>,
}

impl SnapshotEntityImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the entities of `type_name` accepted by `filter`
    pub fn with_filter<F>(mut self, type_name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&ModelElement) -> bool + Send + Sync + 'static,
    {
        self.filters.insert(type_name.into(), Arc::new(filter));
        self
    }
}

impl fmt::Debug for SnapshotEntityImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotEntityImporter")
            .field("filtered_types", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EntityImporter for SnapshotEntityImporter {
    fn import_entities(
        &self,
        snapshot: &dyn SourceSnapshot,
        vertex: &dyn MetamodelVertex,
        mut acc: Vec<ModelElement>,
    ) -> Result<Vec<ModelElement>> {
        let type_name = vertex.type_name();
        let entities = snapshot.entities_of(type_name)?;
        let fetched = entities.len();
        let before = acc.len();

        match self.filters.get(type_name) {
            Some(filter) => acc.extend(entities.into_iter().filter(|e| filter(e))),
            None => acc.extend(entities),
        }

        debug!(
            "imported {} of {} {} entities from snapshot {}",
            acc.len() - before,
            fetched,
            type_name,
            snapshot.info().id
        );
        Ok(acc)
    }
}
