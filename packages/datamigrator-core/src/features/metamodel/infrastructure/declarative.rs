// Declarative Metamodel
//
// YAML/JSON description of entity types over JSON payloads:
//
// ```yaml
// version: 1
// entities:
//   - name: Customer
//     properties: [name]
//   - name: Order
//     fields:
//       - { name: customer, target: Customer }
//       - { name: items, target: Item, multiplicity: collection }
//   - name: Item
// ```
//
// A relationship field holds either scalar ids (references to the target's
// id field) or embedded objects (the related entity itself).

use ahash::AHashMap;
use datamigrator_source::{EntityId, ModelElement};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::errors::{ModelGraphError, Result};
use crate::features::metamodel::domain::{
    FieldEdge, GraphContext, MetamodelVertex, Multiplicity, RelationValue, RelationshipEvaluator,
};
use crate::features::metamodel::infrastructure::Metamodel;

const SUPPORTED_VERSIONS: &[u32] = &[1];

fn default_id_field() -> String {
    "id".to_string()
}

/// Versioned metamodel document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetamodelDefinition {
    pub version: u32,
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDefinition {
    pub name: String,

    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Scalar fields copied onto the vertex
    #[serde(default)]
    pub properties: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub multiplicity: Multiplicity,
}

impl MetamodelDefinition {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelGraphError::config(format!("cannot read metamodel {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ModelGraphError::config(format!("invalid metamodel definition: {}", e)))
    }

    /// Turn the definition into a validated `Metamodel`
    pub fn into_metamodel(self) -> Result<Metamodel> {
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            return Err(ModelGraphError::config(format!(
                "unsupported metamodel version {} (supported: 1)",
                self.version
            )));
        }

        let id_fields: AHashMap<String, String> = self
            .entities
            .iter()
            .map(|e| (e.name.clone(), e.id_field.clone()))
            .collect();

        let mut builder = Metamodel::builder();
        let mut field_edges = Vec::new();

        for entity in self.entities {
            for field in entity.fields {
                // Unknown targets are reported by the metamodel builder
                let target_id_field = id_fields
                    .get(&field.target)
                    .cloned()
                    .unwrap_or_else(default_id_field);
                let evaluator = FieldPathEvaluator {
                    field: field.name.clone(),
                    target_type: field.target.clone(),
                    target_id_field,
                };
                field_edges.push(FieldEdge::new(
                    &entity.name,
                    &field.target,
                    &field.name,
                    field.multiplicity,
                    evaluator,
                ));
            }

            builder = builder.vertex(DeclaredVertex {
                name: entity.name,
                id_field: entity.id_field,
                properties: entity.properties,
            });
        }

        for edge in field_edges {
            builder = builder.field_edge(edge);
        }
        builder.build()
    }
}

/// Entity type described by a `EntityDefinition`
#[derive(Debug, Clone)]
pub struct DeclaredVertex {
    name: String,
    id_field: String,
    properties: Vec<String>,
}

impl DeclaredVertex {
    pub fn new(name: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }
}

impl MetamodelVertex for DeclaredVertex {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn entity_id(&self, entity: &ModelElement) -> Option<EntityId> {
        entity.field(&self.id_field).and_then(EntityId::from_json)
    }

    fn additional_properties(&self, entity: &ModelElement) -> AHashMap<String, Value> {
        self.properties
            .iter()
            .filter_map(|p| entity.field(p).map(|v| (p.clone(), v.clone())))
            .collect()
    }
}

/// Reads a relationship straight out of the source entity's payload
#[derive(Debug, Clone)]
pub struct FieldPathEvaluator {
    field: String,
    target_type: String,
    target_id_field: String,
}

impl FieldPathEvaluator {
    pub fn new(
        field: impl Into<String>,
        target_type: impl Into<String>,
        target_id_field: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            target_type: target_type.into(),
            target_id_field: target_id_field.into(),
        }
    }

    fn related(&self, value: &Value) -> ModelElement {
        match value {
            Value::Object(fields) => ModelElement::new(&self.target_type, fields.clone()),
            scalar => ModelElement::reference(&self.target_type, &self.target_id_field, scalar.clone()),
        }
    }
}

impl RelationshipEvaluator for FieldPathEvaluator {
    fn evaluate(&self, entity: &ModelElement, _graph: &dyn GraphContext) -> RelationValue {
        match entity.field(&self.field) {
            None | Some(Value::Null) => RelationValue::Unset,
            Some(Value::Array(items)) => {
                RelationValue::Many(items.iter().map(|v| self.related(v)).collect())
            }
            Some(value) => RelationValue::One(self.related(value)),
        }
    }
}
