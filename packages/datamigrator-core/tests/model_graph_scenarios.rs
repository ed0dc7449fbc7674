//! End-to-end model graph builds against the in-memory source
//!
//! Every scenario runs against both the coded and the YAML shop metamodel.

mod common;

use common::*;
use datamigrator_core::{
    DeclaredVertex, EntityImporter, ErrorKind, FieldEdge, FieldPathEvaluator, GraphContext,
    Metamodel, MetamodelVertex, ModelGraphBuilder, ModelGraphError, Multiplicity,
    RelationValue, SnapshotEntityImporter,
};
use datamigrator_source::{
    EntityId, InMemorySourceStore, ModelElement, SourceError, SourceSnapshot,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn metamodels() -> Vec<(&'static str, Arc<Metamodel>)> {
    vec![
        ("coded", coded_shop_metamodel()),
        ("yaml", shop_metamodel()),
    ]
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn test_single_reference_with_null() {
    let source = SourceBuilder::new()
        .with(customer(1))
        .with(order(10, json!(1), json!(null)))
        .with(order(11, json!(null), json!(null)))
        .build();

    for (name, metamodel) in metamodels() {
        let graph = build_graph(&metamodel, &source).unwrap();

        assert_eq!(
            vertex_keys(&graph),
            keys(&["Customer:1", "Order:10", "Order:11"]),
            "{name}"
        );
        assert_eq!(
            edge_triples(&graph),
            triples(&[("Order:10", "Customer:1", "customer")]),
            "{name}"
        );

        let o11 = graph.store().get_vertex("Order", &EntityId::Int(11)).unwrap();
        assert_eq!(graph.store().outbound_edges(o11.id()).count(), 0);
    }
}

#[test]
fn test_collection_with_missing_member() {
    let source = SourceBuilder::new()
        .with_all([item(1), item(2)])
        .with(order(10, json!(null), json!([1, 2, 3])))
        .build();

    for (name, metamodel) in metamodels() {
        let graph = build_graph(&metamodel, &source).unwrap();
        let o10 = graph.store().get_vertex("Order", &EntityId::Int(10)).unwrap();

        assert_eq!(graph.store().outbound_edges(o10.id()).count(), 2, "{name}");
        assert_eq!(
            edge_triples(&graph),
            triples(&[("Order:10", "Item:1", "items"), ("Order:10", "Item:2", "items")]),
            "{name}"
        );
        assert_eq!(graph.report().skipped.dangling_references, 1, "{name}");
    }
}

#[test]
fn test_duplicate_primary_id_aborts() {
    let source = SourceBuilder::new()
        .with(customer(7))
        .with(customer(7))
        .with(order(1, json!(7), json!([])))
        .build();

    for (name, metamodel) in metamodels() {
        let err = build_graph(&metamodel, &source).unwrap_err();
        match err {
            ModelGraphError::DuplicateVertex { type_name, id } => {
                assert_eq!(type_name, "Customer", "{name}");
                assert_eq!(id, EntityId::Int(7), "{name}");
            }
            other => panic!("{name}: expected duplicate vertex, got {other}"),
        }
        assert_eq!(source.active_snapshots(), 0);
    }
}

// ============================================================
// Edge resolution properties
// ============================================================

#[test]
fn test_partial_collection_keeps_resolvable_members() {
    let source = SourceBuilder::new()
        .with_all([item(1), item(2), item(3)])
        .with(order(10, json!(null), json!([1, null, 2, 42, 3])))
        .build();

    for (name, metamodel) in metamodels() {
        let graph = build_graph(&metamodel, &source).unwrap();
        let skipped = graph.report().skipped;

        assert_eq!(graph.store().edge_count(), 3, "{name}");
        assert_eq!(skipped.unresolvable_ids, 1, "{name}");
        assert_eq!(skipped.dangling_references, 1, "{name}");
    }
}

#[test]
fn test_empty_collection_creates_no_edges() {
    let source = SourceBuilder::new()
        .with(item(1))
        .with(order(10, json!(null), json!([])))
        .build();

    let graph = build_graph(&shop_metamodel(), &source).unwrap();
    assert_eq!(graph.store().edge_count(), 0);
    assert_eq!(graph.store().vertex_count(), 2);
}

#[test]
fn test_string_ids_and_type_scoping() {
    // Same id value under two types must not cross-resolve
    let source = SourceBuilder::new()
        .with(entity("Customer", json!({"id": "c-1"})))
        .with(entity("Item", json!({"sku": "c-1"})))
        .with(entity("Order", json!({"id": "o-1", "customer": "c-1", "items": ["c-1"]})))
        .build();

    let graph = build_graph(&shop_metamodel(), &source).unwrap();
    assert_eq!(
        edge_triples(&graph),
        triples(&[
            ("Order:o-1", "Customer:c-1", "customer"),
            ("Order:o-1", "Item:c-1", "items"),
        ])
    );
}

#[test]
fn test_embedded_related_entity() {
    let source = SourceBuilder::new()
        .with(customer(5))
        .with(entity("Order", json!({"id": 1, "customer": {"id": 5, "name": "inline"}})))
        .build();

    let graph = build_graph(&shop_metamodel(), &source).unwrap();
    assert_eq!(
        edge_triples(&graph),
        triples(&[("Order:1", "Customer:5", "customer")])
    );
}

#[test]
fn test_properties_and_adjacency() {
    let source = SourceBuilder::new()
        .with_all([customer(1), item(1)])
        .with(order(10, json!(1), json!([1])))
        .with(order(11, json!(1), json!([1])))
        .build();

    let graph = build_graph(&coded_shop_metamodel(), &source).unwrap();
    let store = graph.store();
    let c1 = store.get_vertex("Customer", &EntityId::Int(1)).unwrap();

    assert_eq!(c1.property("name"), Some(&json!("customer-1")));
    assert_eq!(store.incoming_edges(c1.id()).count(), 2);
    assert_eq!(store.vertices_of_type("Order").count(), 2);

    let stats = store.stats();
    assert_eq!(stats.edges_by_field.get("Order.customer"), Some(&2));
    assert_eq!(stats.edges_by_field.get("Order.items"), Some(&2));
    assert_eq!(stats.vertices_by_type.get("Item"), Some(&1));
}

// ============================================================
// Determinism
// ============================================================

fn mixed_source() -> InMemorySourceStore {
    let mut builder = SourceBuilder::new();
    for i in 0..50 {
        builder = builder.with(customer(i)).with(item(i));
    }
    for i in 0..200 {
        let items: Vec<i64> = (0..(i % 7)).map(|k| (i * 3 + k) % 60).collect();
        builder = builder.with(order(1000 + i, json!(i % 55), json!(items)));
    }
    builder.build()
}

#[test]
fn test_rebuild_yields_identical_graph() {
    let source = mixed_source();
    let metamodel = shop_metamodel();

    let first = build_graph(&metamodel, &source).unwrap();
    let second = build_graph(&metamodel, &source).unwrap();

    assert_eq!(first.store().export(), second.store().export());
    assert_eq!(first.report().skipped, second.report().skipped);
}

#[test]
fn test_parallel_matches_sequential() {
    let source = mixed_source();
    let metamodel = coded_shop_metamodel();

    let sequential = build_graph_with(&metamodel, &source, sequential_config()).unwrap();
    let parallel = build_graph_with(&metamodel, &source, parallel_config()).unwrap();

    assert_eq!(sequential.report().workers, 1);
    assert_eq!(sequential.store().export(), parallel.store().export());
    assert_eq!(vertex_keys(&sequential).len(), 300);
}

// ============================================================
// Fatal conditions
// ============================================================

#[test]
fn test_primary_entity_without_id_is_configuration_error() {
    let source = SourceBuilder::new()
        .with(customer(1))
        .with(entity("Customer", json!({"name": "ghost"})))
        .build();

    for (name, metamodel) in metamodels() {
        let err = build_graph(&metamodel, &source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "{name}");
        assert!(!err.is_retryable());
        assert_eq!(source.active_snapshots(), 0);
    }
}

#[test]
fn test_undeclared_field_target_is_configuration_error() {
    let err = Metamodel::builder()
        .vertex(DeclaredVertex::new("Order", "id"))
        .field_edge(FieldEdge::new(
            "Order",
            "Warehouse",
            "warehouse",
            Multiplicity::Single,
            FieldPathEvaluator::new("warehouse", "Warehouse", "id"),
        ))
        .build()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_multiplicity_mismatch_aborts_build() {
    let metamodel = Arc::new(
        Metamodel::builder()
            .vertex(DeclaredVertex::new("Customer", "id"))
            .vertex(DeclaredVertex::new("Order", "id"))
            .field_edge(FieldEdge::new(
                "Order",
                "Customer",
                "customer",
                Multiplicity::Collection,
                FieldPathEvaluator::new("customer", "Customer", "id"),
            ))
            .build()
            .unwrap(),
    );
    let source = SourceBuilder::new()
        .with(customer(1))
        .with(order(10, json!(1), json!(null)))
        .build();

    let err = build_graph(&metamodel, &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("Order.customer is declared collection"));
}

/// Importer that loses the connection on one type
struct FlakyImporter {
    fail_on: &'static str,
    calls: AtomicUsize,
}

impl EntityImporter for FlakyImporter {
    fn import_entities(
        &self,
        snapshot: &dyn SourceSnapshot,
        vertex: &dyn MetamodelVertex,
        acc: Vec<ModelElement>,
    ) -> datamigrator_core::Result<Vec<ModelElement>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if vertex.type_name() == self.fail_on {
            return Err(SourceError::connection("connection reset by peer").into());
        }
        SnapshotEntityImporter::new().import_entities(snapshot, vertex, acc)
    }
}

#[test]
fn test_source_failure_mid_phase_releases_snapshot() {
    let source = mixed_source();
    let importer = FlakyImporter {
        fail_on: "Item",
        calls: AtomicUsize::new(0),
    };

    let err = ModelGraphBuilder::new(importer)
        .with_config(parallel_config())
        .build(shop_metamodel(), &source)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceIo);
    assert!(err.is_retryable());
    assert_eq!(source.active_snapshots(), 0);
}

#[test]
fn test_disconnected_source_is_transient() {
    let source = mixed_source();
    source.disconnect();

    let err = build_graph(&shop_metamodel(), &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceIo);
    assert!(err.is_retryable());

    source.reconnect();
    let graph = build_graph(&shop_metamodel(), &source).unwrap();
    assert_eq!(graph.store().vertex_count(), 300);
}

// ============================================================
// Snapshot consistency
// ============================================================

/// Importer that writes to the source while phase 1 is running
struct MeddlingImporter {
    source: Arc<InMemorySourceStore>,
}

impl EntityImporter for MeddlingImporter {
    fn import_entities(
        &self,
        snapshot: &dyn SourceSnapshot,
        vertex: &dyn MetamodelVertex,
        acc: Vec<ModelElement>,
    ) -> datamigrator_core::Result<Vec<ModelElement>> {
        self.source.insert(customer(999));
        self.source.insert(order(9999, json!(999), json!(null)));
        SnapshotEntityImporter::new().import_entities(snapshot, vertex, acc)
    }
}

#[test]
fn test_all_types_read_from_one_snapshot() {
    let source = Arc::new(
        SourceBuilder::new()
            .with(customer(1))
            .with(order(10, json!(1), json!(null)))
            .build(),
    );
    let importer = MeddlingImporter {
        source: Arc::clone(&source),
    };

    let graph = ModelGraphBuilder::new(importer)
        .with_config(parallel_config())
        .build(shop_metamodel(), &*source)
        .unwrap();

    assert_eq!(vertex_keys(&graph), keys(&["Customer:1", "Order:10"]));
    assert_eq!(source.active_snapshots(), 0);
}

// ============================================================
// Graph context
// ============================================================

fn evaluator<F>(f: F) -> F
where
    F: Fn(&ModelElement, &dyn GraphContext) -> RelationValue + Send + Sync,
{
    f
}

#[test]
fn test_evaluator_resolves_through_graph_context() {
    let complete_views = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&complete_views);

    // Only hands out customers that were materialized, as their full entity
    let customer_of = evaluator(move |order, graph| {
        let every_type_visible = graph.contains_vertex("Customer", &EntityId::Int(1))
            && graph.contains_vertex("Item", &EntityId::Int(1))
            && graph.contains_vertex("Order", &EntityId::Int(10))
            && graph.contains_vertex("Order", &EntityId::Int(11));
        if every_type_visible {
            seen.fetch_add(1, Ordering::SeqCst);
        }

        let Some(id) = order.field("customer").and_then(EntityId::from_json) else {
            return RelationValue::Unset;
        };
        if !graph.contains_vertex("Customer", &id) {
            return RelationValue::Unset;
        }
        match graph.vertex_entity("Customer", &id) {
            Some(customer) => RelationValue::One(customer.clone()),
            None => RelationValue::Unset,
        }
    });

    let metamodel = Arc::new(
        Metamodel::builder()
            .vertex(CustomerType)
            .vertex(ItemType)
            .vertex(OrderType)
            .field_edge(FieldEdge::new(
                "Order",
                "Customer",
                "customer",
                Multiplicity::Single,
                customer_of,
            ))
            .build()
            .unwrap(),
    );
    let source = SourceBuilder::new()
        .with_all([customer(1), item(1)])
        .with(order(10, json!(1), json!(null)))
        .with(order(11, json!(2), json!(null)))
        .build();

    let graph = build_graph_with(&metamodel, &source, parallel_config()).unwrap();

    assert_eq!(
        edge_triples(&graph),
        triples(&[("Order:10", "Customer:1", "customer")])
    );
    assert_eq!(complete_views.load(Ordering::SeqCst), 2);

    let skipped = graph.report().skipped;
    assert_eq!(skipped.unset_fields, 1);
    assert_eq!(skipped.dangling_references, 0);
}

#[test]
fn test_identifier_above_i64_range() {
    let big = u64::MAX;
    let source = SourceBuilder::new()
        .with(entity("Customer", json!({"id": big})))
        .with(entity("Order", json!({"id": 1, "customer": big})))
        .build();

    for (name, metamodel) in metamodels() {
        let graph = build_graph(&metamodel, &source).unwrap();
        let big_customer = format!("Customer:{big}");

        assert!(
            graph
                .store()
                .get_vertex("Customer", &EntityId::UInt(big))
                .is_some(),
            "{name}"
        );
        assert_eq!(
            edge_triples(&graph),
            triples(&[("Order:1", big_customer.as_str(), "customer")]),
            "{name}"
        );
    }
}
