//! Test fixtures: metamodels and entities
//!
//! The shop model is declared twice, once with hand-written vertex types and
//! closure evaluators and once as YAML, so both metamodel front ends get
//! exercised by the same scenarios.

use datamigrator_core::{
    FieldEdge, GraphContext, Metamodel, MetamodelDefinition, MetamodelVertex, Multiplicity,
    RelationValue,
};
use datamigrator_source::{EntityId, ModelElement};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SHOP_YAML: &str = r#"
version: 1
entities:
  - name: Customer
    properties: [name]
  - name: Item
    id_field: sku
    properties: [label]
  - name: Order
    fields:
      - { name: customer, target: Customer }
      - { name: items, target: Item, multiplicity: collection }
"#;

/// Shop metamodel from `SHOP_YAML`
pub fn shop_metamodel() -> Arc<Metamodel> {
    let definition = MetamodelDefinition::from_yaml_str(SHOP_YAML).expect("valid shop metamodel");
    Arc::new(definition.into_metamodel().expect("shop metamodel builds"))
}

#[derive(Debug)]
pub struct CustomerType;

impl MetamodelVertex for CustomerType {
    fn type_name(&self) -> &str {
        "Customer"
    }

    fn entity_id(&self, entity: &ModelElement) -> Option<EntityId> {
        entity.field("id").and_then(EntityId::from_json)
    }

    fn additional_properties(&self, entity: &ModelElement) -> ahash::AHashMap<String, Value> {
        entity
            .field("name")
            .map(|name| [("name".to_string(), name.clone())].into_iter().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct ItemType;

impl MetamodelVertex for ItemType {
    fn type_name(&self) -> &str {
        "Item"
    }

    fn entity_id(&self, entity: &ModelElement) -> Option<EntityId> {
        entity.field("sku").and_then(EntityId::from_json)
    }
}

#[derive(Debug)]
pub struct OrderType;

impl MetamodelVertex for OrderType {
    fn type_name(&self) -> &str {
        "Order"
    }

    fn entity_id(&self, entity: &ModelElement) -> Option<EntityId> {
        entity.field("id").and_then(EntityId::from_json)
    }
}

fn order_customer(order: &ModelElement, _: &dyn GraphContext) -> RelationValue {
    match order.field("customer") {
        None | Some(Value::Null) => RelationValue::Unset,
        Some(id) => RelationValue::One(ModelElement::reference("Customer", "id", id.clone())),
    }
}

fn order_items(order: &ModelElement, _: &dyn GraphContext) -> RelationValue {
    match order.field("items") {
        Some(Value::Array(skus)) => RelationValue::Many(
            skus.iter()
                .map(|sku| ModelElement::reference("Item", "sku", sku.clone()))
                .collect(),
        ),
        _ => RelationValue::Unset,
    }
}

/// Shop metamodel with one `MetamodelVertex` impl per type
pub fn coded_shop_metamodel() -> Arc<Metamodel> {
    let metamodel = Metamodel::builder()
        .vertex(CustomerType)
        .vertex(ItemType)
        .vertex(OrderType)
        .field_edge(FieldEdge::new(
            "Order",
            "Customer",
            "customer",
            Multiplicity::Single,
            order_customer,
        ))
        .field_edge(FieldEdge::new(
            "Order",
            "Item",
            "items",
            Multiplicity::Collection,
            order_items,
        ))
        .build()
        .expect("coded shop metamodel builds");
    Arc::new(metamodel)
}

pub fn customer(id: i64) -> ModelElement {
    entity("Customer", json!({ "id": id, "name": format!("customer-{id}") }))
}

pub fn item(sku: i64) -> ModelElement {
    entity("Item", json!({ "sku": sku, "label": format!("item-{sku}") }))
}

pub fn order(id: i64, customer: Value, items: Value) -> ModelElement {
    entity("Order", json!({ "id": id, "customer": customer, "items": items }))
}

pub fn entity(type_name: &str, payload: Value) -> ModelElement {
    ModelElement::from_json(type_name, payload).expect("fixture payload is an object")
}
