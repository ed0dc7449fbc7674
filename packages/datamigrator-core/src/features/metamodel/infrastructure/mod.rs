// Metamodel Infrastructure
//
// petgraph-backed schema graph and the declarative (YAML) metamodel

pub mod declarative;
pub mod metamodel_graph;

pub use declarative::{
    DeclaredVertex, EntityDefinition, FieldDefinition, FieldPathEvaluator, MetamodelDefinition,
};
pub use metamodel_graph::{Metamodel, MetamodelBuilder};
