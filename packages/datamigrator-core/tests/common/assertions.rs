//! Identity-based graph assertions

use datamigrator_core::ModelGraph;
use std::collections::BTreeSet;

/// Vertex keys rendered as `Type:id`
pub fn vertex_keys(graph: &ModelGraph) -> BTreeSet<String> {
    graph
        .store()
        .all_vertices()
        .map(|v| v.key().to_string())
        .collect()
}

/// Edges rendered as `(source, target, field)`
pub fn edge_triples(graph: &ModelGraph) -> Vec<(String, String, String)> {
    let store = graph.store();
    let mut triples: Vec<_> = store
        .edges()
        .map(|e| {
            let source = store.vertex(e.source()).expect("edge source in store");
            let target = store.vertex(e.target()).expect("edge target in store");
            (
                source.key().to_string(),
                target.key().to_string(),
                e.field_name().to_string(),
            )
        })
        .collect();
    triples.sort();
    triples
}

pub fn keys(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn triples(items: &[(&str, &str, &str)]) -> Vec<(String, String, String)> {
    let mut out: Vec<_> = items
        .iter()
        .map(|(s, t, f)| (s.to_string(), t.to_string(), f.to_string()))
        .collect();
    out.sort();
    out
}
