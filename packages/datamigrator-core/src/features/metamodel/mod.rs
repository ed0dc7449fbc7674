// Metamodel - Schema of the Source Data Model
//
// Entity types (vertices) and the relationship fields between them (field
// edges). Read-only input of the model graph builder.
//
// ## Architecture
// - Domain: capability traits (MetamodelVertex, RelationshipEvaluator), FieldEdge
// - Infrastructure: petgraph schema graph, declarative YAML definitions

pub mod domain;
pub mod infrastructure;

pub use domain::{
    FieldEdge, GraphContext, MetamodelVertex, Multiplicity, RelationValue, RelationshipEvaluator,
};
pub use infrastructure::{
    DeclaredVertex, FieldPathEvaluator, Metamodel, MetamodelBuilder, MetamodelDefinition,
};
