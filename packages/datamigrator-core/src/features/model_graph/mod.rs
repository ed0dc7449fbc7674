// Model Graph - Two-Phase Graph Materialization
//
// Metamodel + source snapshot -> addressable property graph:
// every imported entity is a vertex keyed by (type, id), every resolvable
// relationship occurrence is an edge.
//
// ## Architecture
// - Domain: GraphStore, ModelVertex, ModelEdge, BuildReport
// - Ports: EntityImporter
// - Infrastructure: importer, phase 1 materializer, phase 2 resolver, builder
// - Application: ModelGraphUseCase
//
// ## Gaps vs. failures
// Unset relationships, related entities without an id and references to
// entities that were never imported are counted and skipped. Missing primary
// ids, duplicate vertices and source I/O errors abort the build.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export application layer
pub use application::{ModelGraphUseCase, ModelGraphUseCaseImpl};

// Re-exports
pub use domain::{
    BuildReport, EdgeExport, EdgeId, GraphExport, GraphStats, GraphStore, ModelEdge, ModelGraph,
    ModelVertex, PendingEdge, SkipCounts, VertexExport, VertexId, VertexKey,
};
pub use infrastructure::{ModelGraphBuilder, SnapshotEntityImporter};
pub use ports::EntityImporter;
