// Metamodel Domain Models
//
// Entity types are capability objects (one `MetamodelVertex` impl per type);
// relationships are `FieldEdge`s carrying an explicit multiplicity tag and an
// evaluator.

use ahash::AHashMap;
use datamigrator_source::{EntityId, ModelElement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::infrastructure::Metamodel;
use crate::shared::{intern_str, InternedString};

// ============================================================
// Vertex Types
// ============================================================

/// Per-type behaviour of the source data model
pub trait MetamodelVertex: fmt::Debug + Send + Sync {
    /// Unique type name
    fn type_name(&self) -> &str;

    /// Identity of an entity of this type; `None` when it cannot be resolved
    fn entity_id(&self, entity: &ModelElement) -> Option<EntityId>;

    /// Scalar properties copied onto the graph vertex
    fn additional_properties(&self, entity: &ModelElement) -> AHashMap<String, serde_json::Value> {
        let _ = entity;
        AHashMap::new()
    }

    /// Relationship fields declared on this type
    fn outbound_field_edges<'m>(&self, metamodel: &'m Metamodel) -> Vec<&'m Arc<FieldEdge>> {
        metamodel.outbound_field_edges(self.type_name())
    }
}

// ============================================================
// Relationships
// ============================================================

/// Declared cardinality of a relationship field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    #[default]
    Single,
    Collection,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Single => f.write_str("single"),
            Multiplicity::Collection => f.write_str("collection"),
        }
    }
}

/// Raw result of evaluating a relationship field on one entity
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    Unset,
    One(ModelElement),
    Many(Vec<ModelElement>),
}

impl RelationValue {
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, RelationValue::Unset)
    }

    fn shape(&self) -> &'static str {
        match self {
            RelationValue::Unset => "nothing",
            RelationValue::One(_) => "a single entity",
            RelationValue::Many(_) => "a collection",
        }
    }
}

/// Read-only view of already materialized vertices
///
/// Handed to relationship evaluators during edge resolution.
pub trait GraphContext: Sync {
    fn contains_vertex(&self, type_name: &str, id: &EntityId) -> bool;

    fn vertex_entity(&self, type_name: &str, id: &EntityId) -> Option<&ModelElement>;
}

/// Computes the related entities behind one relationship field
pub trait RelationshipEvaluator: Send + Sync {
    fn evaluate(&self, entity: &ModelElement, graph: &dyn GraphContext) -> RelationValue;
}

impl<F> RelationshipEvaluator for F
where
    F: Fn(&ModelElement, &dyn GraphContext) -> RelationValue + Send + Sync,
{
    fn evaluate(&self, entity: &ModelElement, graph: &dyn GraphContext) -> RelationValue {
        self(entity, graph)
    }
}

/// One relationship field between two entity types
#[derive(Clone)]
pub struct FieldEdge {
    source: InternedString,
    target: InternedString,
    field_name: InternedString,
    multiplicity: Multiplicity,
    evaluator: Arc<dyn RelationshipEvaluator>,
}

impl FieldEdge {
    pub fn new(
        source: impl AsRef<str>,
        target: impl AsRef<str>,
        field_name: impl AsRef<str>,
        multiplicity: Multiplicity,
        evaluator: impl RelationshipEvaluator + 'static,
    ) -> Self {
        Self {
            source: intern_str(source),
            target: intern_str(target),
            field_name: intern_str(field_name),
            multiplicity,
            evaluator: Arc::new(evaluator),
        }
    }

    #[inline]
    pub fn source_type(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn target_type(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Interned field name, shared with every edge built from this field
    #[inline]
    pub fn interned_field_name(&self) -> &InternedString {
        &self.field_name
    }

    #[inline]
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Evaluate the field on `entity` without interpreting the result
    pub fn evaluate(&self, entity: &ModelElement, graph: &dyn GraphContext) -> RelationValue {
        self.evaluator.evaluate(entity, graph)
    }

    /// Normalize an evaluated value to "zero or more related entities"
    ///
    /// This is the only place multiplicity is looked at. A value whose shape
    /// contradicts the declared multiplicity means the metamodel is wrong.
    pub fn normalize(&self, value: RelationValue) -> Result<Vec<ModelElement>> {
        match (self.multiplicity, value) {
            (_, RelationValue::Unset) => Ok(Vec::new()),
            (Multiplicity::Single, RelationValue::One(related)) => Ok(vec![related]),
            (Multiplicity::Collection, RelationValue::Many(related)) => Ok(related),
            (multiplicity, other) => Err(ModelGraphError::config(format!(
                "field {}.{} is declared {} but evaluated to {}",
                self.source,
                self.field_name,
                multiplicity,
                other.shape()
            ))),
        }
    }

    /// Evaluate then normalize
    pub fn related_entities(
        &self,
        entity: &ModelElement,
        graph: &dyn GraphContext,
    ) -> Result<Vec<ModelElement>> {
        self.normalize(self.evaluate(entity, graph))
    }
}

impl fmt::Debug for FieldEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEdge")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("field_name", &self.field_name)
            .field("multiplicity", &self.multiplicity)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for FieldEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {} ({})",
            self.source, self.field_name, self.target, self.multiplicity
        )
    }
}
