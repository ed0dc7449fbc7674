//! Model Graph Ports
//!
//! The builder reaches the source store only through `EntityImporter`, always
//! inside the snapshot it acquired for vertex materialization.

use datamigrator_source::{ModelElement, SourceSnapshot};

use crate::errors::Result;
use crate::features::metamodel::MetamodelVertex;

/// Fetches the raw entities of one type
///
/// # Implementors
/// - `SnapshotEntityImporter` (infrastructure/entity_importer.rs)
pub trait EntityImporter: Send + Sync {
    /// Append every entity of `vertex`'s type to `acc` and return it
    ///
    /// Called concurrently for different types against the same snapshot.
    fn import_entities(
        &self,
        snapshot: &dyn SourceSnapshot,
        vertex: &dyn MetamodelVertex,
        acc: Vec<ModelElement>,
    ) -> Result<Vec<ModelElement>>;
}
