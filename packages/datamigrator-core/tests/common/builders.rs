//! Builders for sources and graphs

use datamigrator_core::{
    Metamodel, ModelGraph, ModelGraphBuilder, ModelGraphConfig, Preset, Result,
    SnapshotEntityImporter,
};
use datamigrator_source::{InMemorySourceStore, ModelElement, SourceStore};
use std::sync::Arc;

/// Fluent in-memory source
#[derive(Default)]
pub struct SourceBuilder {
    entities: Vec<ModelElement>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity: ModelElement) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_all(mut self, entities: impl IntoIterator<Item = ModelElement>) -> Self {
        self.entities.extend(entities);
        self
    }

    pub fn build(self) -> InMemorySourceStore {
        let store = InMemorySourceStore::new();
        store.insert_many(self.entities);
        store
    }
}

/// Single worker, no Rayon
pub fn sequential_config() -> ModelGraphConfig {
    ModelGraphConfig::preset(Preset::Thorough)
}

/// Several workers regardless of the host
pub fn parallel_config() -> ModelGraphConfig {
    ModelGraphConfig::preset(Preset::Balanced).parallel(|p| p.num_workers(4))
}

pub fn build_graph(metamodel: &Arc<Metamodel>, source: &dyn SourceStore) -> Result<ModelGraph> {
    build_graph_with(metamodel, source, parallel_config())
}

pub fn build_graph_with(
    metamodel: &Arc<Metamodel>,
    source: &dyn SourceStore,
    config: ModelGraphConfig,
) -> Result<ModelGraph> {
    ModelGraphBuilder::new(SnapshotEntityImporter::new())
        .with_config(config)
        .build(Arc::clone(metamodel), source)
}
