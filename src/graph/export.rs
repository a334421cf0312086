// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pure graph derivation for external consumers (reporting, visualization).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::traits::Node;

/// Derived producer -> consumer edges, by node name. An edge (A, B) exists
/// iff B declares an input dataset equal to A's output dataset.
pub fn edges(nodes: &[Arc<dyn Node>]) -> BTreeSet<(String, String)> {
    let producer_of: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.output_dataset(), n.name()))
        .collect();

    let mut edges = BTreeSet::new();
    for node in nodes {
        for dataset in node.input_datasets() {
            if let Some(&producer) = producer_of.get(dataset.as_str()) {
                if producer != node.name() {
                    edges.insert((producer.to_string(), node.name().to_string()));
                }
            }
        }
    }
    edges
}

/// Render the node set as Graphviz DOT text. Rendering itself stays with
/// external tooling; this only emits the textual graph.
pub fn to_dot(nodes: &[Arc<dyn Node>]) -> String {
    let mut out = String::from("digraph dag {\n");
    for node in nodes {
        out.push_str(&format!(
            "    \"{}\" [label=\"{}\\n[{}]\"];\n",
            node.name(),
            node.name(),
            node.node_type()
        ));
    }
    for (producer, consumer) in edges(nodes) {
        out.push_str(&format!("    \"{}\" -> \"{}\";\n", producer, consumer));
    }
    out.push_str("}\n");
    out
}
