/*
 * Datamigrator Core - Model Graph Builder
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Interned names
 * - config/      : Presets, YAML and environment overrides
 * - features/    : metamodel -> model_graph
 *
 * Performance:
 * - Rayon work-stealing for both build phases
 * - Dense vertex/edge storage with a (type, id) index
 */

#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration (presets, YAML v1, `DATAMIGRATOR__*` env)
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

/// Shared utilities
pub mod shared;

pub use config::{ModelGraphConfig, Preset};
pub use errors::{ErrorKind, ModelGraphError, Result};
pub use features::metamodel::{
    DeclaredVertex, FieldEdge, FieldPathEvaluator, GraphContext, Metamodel, MetamodelBuilder,
    MetamodelDefinition, MetamodelVertex, Multiplicity, RelationValue, RelationshipEvaluator,
};
pub use features::model_graph::{
    BuildReport, EntityImporter, GraphExport, GraphStats, GraphStore, ModelEdge, ModelGraph,
    ModelGraphBuilder, ModelGraphUseCase, ModelGraphUseCaseImpl, ModelVertex, SkipCounts,
    SnapshotEntityImporter, VertexId, VertexKey,
};
