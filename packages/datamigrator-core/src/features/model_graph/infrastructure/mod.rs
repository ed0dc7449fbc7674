// Model Graph Infrastructure
//
// - entity_importer: snapshot-backed `EntityImporter`
// - vertex_materializer: phase 1
// - edge_resolver: phase 2
// - builder: orchestration, thread pool, snapshot scope

pub mod builder;
pub mod edge_resolver;
pub mod entity_importer;
pub mod vertex_materializer;

pub use builder::ModelGraphBuilder;
pub use edge_resolver::{EdgeResolver, Resolution};
pub use entity_importer::SnapshotEntityImporter;
pub use vertex_materializer::VertexMaterializer;
