// Model Graph Builder - Main Entry Point
//
// Metamodel + source store -> ModelGraph in two strictly sequential phases:
// 1. Vertex materialization: one snapshot, held until every type is imported
// 2. Edge resolution: parallel per vertex, merged into the store at the end
//
// Both phases run inside a dedicated Rayon pool sized from `ParallelConfig`.

use datamigrator_source::SourceStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{EdgeResolver, VertexMaterializer};
use crate::config::ModelGraphConfig;
use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::Metamodel;
use crate::features::model_graph::domain::{BuildReport, GraphStore, ModelGraph};
use crate::features::model_graph::ports::EntityImporter;

/// Two-phase model graph builder
///
/// ## Usage
/// ```text
/// let builder = ModelGraphBuilder::new(SnapshotEntityImporter::new());
/// let graph = builder.build(metamodel, &source)?;
/// ```
///
/// A failed build returns no graph. Snapshot release happens on every exit
/// path because the snapshot is dropped when phase 1 leaves scope.
pub struct ModelGraphBuilder {
    importer: Arc<dyn EntityImporter>,
    config: ModelGraphConfig,
}

impl ModelGraphBuilder {
    pub fn new(importer: impl EntityImporter + 'static) -> Self {
        Self::with_shared_importer(Arc::new(importer))
    }

    pub fn with_shared_importer(importer: Arc<dyn EntityImporter>) -> Self {
        Self {
            importer,
            config: ModelGraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ModelGraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ModelGraphConfig {
        &self.config
    }

    /// Build the graph of everything `source` holds for `metamodel`'s types
    pub fn build(&self, metamodel: Arc<Metamodel>, source: &dyn SourceStore) -> Result<ModelGraph> {
        self.config.validate()?;

        let workers = self.config.parallel.effective_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .stack_size(self.config.parallel.stack_size_mb * 1024 * 1024)
            .thread_name(|i| format!("model-graph-{}", i))
            .build()
            .map_err(|e| ModelGraphError::config(format!("cannot start worker pool: {}", e)))?;

        pool.install(|| self.build_in_pool(metamodel, source, workers))
    }

    fn build_in_pool(
        &self,
        metamodel: Arc<Metamodel>,
        source: &dyn SourceStore,
        workers: usize,
    ) -> Result<ModelGraph> {
        info!(
            "model graph build: {} types, {} field edges, {} workers",
            metamodel.vertex_count(),
            metamodel.field_edge_count(),
            workers
        );

        // Phase 1: vertices, inside the snapshot scope
        let started = Instant::now();
        let mut store = GraphStore::new();
        let snapshot_id = {
            let snapshot = source.open_snapshot()?;
            let snapshot_id = snapshot.info().id;
            debug!(
                "phase 1 reading snapshot {} of {}",
                snapshot_id,
                snapshot.info().source
            );
            VertexMaterializer::new(self.importer.as_ref()).materialize(
                &metamodel,
                snapshot.as_ref(),
                &mut store,
            )?;
            snapshot_id
        };
        let vertex_phase = started.elapsed();
        info!(
            "phase 1 complete: {} vertices in {:?}",
            store.vertex_count(),
            vertex_phase
        );

        // Phase 2: edges
        let started = Instant::now();
        let resolution = EdgeResolver::new(&metamodel)
            .log_skipped(self.config.resolution.log_skipped_references)
            .resolve(&store)?;
        let skipped = resolution.skipped;
        store.extend_edges(resolution.edges)?;
        let edge_phase = started.elapsed();
        info!(
            "phase 2 complete: {} edges, {} skipped references, {} unset fields in {:?}",
            store.edge_count(),
            skipped.skipped_references(),
            skipped.unset_fields,
            edge_phase
        );

        let report = BuildReport {
            snapshot_id,
            vertex_types: metamodel.vertex_count(),
            vertices: store.vertex_count(),
            edges: store.edge_count(),
            skipped,
            workers,
            vertex_phase,
            edge_phase,
        };
        Ok(ModelGraph::new(store, metamodel, report))
    }
}

impl std::fmt::Debug for ModelGraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGraphBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
