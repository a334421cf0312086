// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency resolution: dataset-name linkage to execution order.
//!
//! Edges are derived purely from declared datasets: an edge A -> B exists
//! iff B declares an input dataset equal to A's output dataset. String
//! equality is the sole linkage mechanism; no schema information crosses
//! this boundary. The resolver is pure, synchronous, and in-memory.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::errors::{ResolveError, ValidationError};
use crate::traits::Node;

/// A validated collection of nodes: names and output datasets are unique.
#[derive(Debug)]
pub struct Dag {
    nodes: Vec<Arc<dyn Node>>,
    index: HashMap<String, usize>,
}

impl Dag {
    /// Assemble a DAG, enforcing cross-node uniqueness. Per-node structural
    /// rules have already run in the definition builder.
    pub fn new(nodes: Vec<Arc<dyn Node>>) -> Result<Self, ValidationError> {
        let mut index = HashMap::new();
        let mut producer_of: HashMap<String, String> = HashMap::new();
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name().to_string(), i).is_some() {
                return Err(ValidationError::DuplicateNodeName {
                    name: node.name().to_string(),
                });
            }
            if let Some(first) = producer_of.insert(
                node.output_dataset().to_string(),
                node.name().to_string(),
            ) {
                return Err(ValidationError::DuplicateOutputDataset {
                    first,
                    second: node.name().to_string(),
                    dataset: node.output_dataset().to_string(),
                });
            }
        }
        Ok(Self { nodes, index })
    }

    pub fn nodes(&self) -> &[Arc<dyn Node>] {
        &self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Node>> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The resolver's output: a deterministic topological order, the waves the
/// executor schedules, derived adjacency, and the boundary inputs that must
/// come from the catalog.
#[derive(Debug, Clone)]
pub struct DagPlan {
    order: Vec<String>,
    waves: Vec<Vec<String>>,
    consumers: HashMap<String, Vec<String>>,
    producers: HashMap<String, Vec<String>>,
    boundary_inputs: BTreeSet<String>,
}

impl DagPlan {
    /// Topological order; every producer precedes every consumer. Ties
    /// break by node name ascending, so identical input always yields an
    /// identical order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Waves of nodes whose producers all sit in earlier waves. Members of
    /// one wave are safe to execute concurrently.
    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    /// Input datasets with no producer in the DAG; fetched from the catalog.
    pub fn boundary_inputs(&self) -> &BTreeSet<String> {
        &self.boundary_inputs
    }

    pub fn producers_of(&self, node: &str) -> &[String] {
        self.producers.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn consumers_of(&self, node: &str) -> &[String] {
        self.consumers.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every node transitively reachable through consumer edges. Used to
    /// skip the downstream closure when a producer fails.
    pub fn downstream_of(&self, node: &str) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let mut frontier = vec![node.to_string()];
        while let Some(current) = frontier.pop() {
            for consumer in self.consumers_of(&current) {
                if reached.insert(consumer.clone()) {
                    frontier.push(consumer.clone());
                }
            }
        }
        reached
    }
}

/// Derive edges from dataset names and compute the execution plan.
///
/// Kahn's algorithm over the derived graph, level by level: each wave is
/// the set of nodes whose remaining in-degree reached zero. An input with
/// no producer is a boundary input, not an error; a cycle aborts resolution
/// with the participating nodes named.
pub fn resolve(dag: &Dag) -> Result<DagPlan, ResolveError> {
    let nodes = dag.nodes();

    let mut producer_of: HashMap<&str, &str> = HashMap::new();
    for node in nodes {
        producer_of.insert(node.output_dataset(), node.name());
    }

    let mut consumers: HashMap<String, Vec<String>> = HashMap::new();
    let mut producers: HashMap<String, Vec<String>> = HashMap::new();
    let mut boundary_inputs = BTreeSet::new();
    for node in nodes {
        consumers.entry(node.name().to_string()).or_default();
        producers.entry(node.name().to_string()).or_default();
    }
    for node in nodes {
        for dataset in node.input_datasets() {
            match producer_of.get(dataset.as_str()) {
                Some(&producer) => {
                    consumers
                        .entry(producer.to_string())
                        .or_default()
                        .push(node.name().to_string());
                    producers
                        .entry(node.name().to_string())
                        .or_default()
                        .push(producer.to_string());
                }
                None => {
                    boundary_inputs.insert(dataset.clone());
                }
            }
        }
    }

    let mut in_degree: HashMap<String, usize> = producers
        .iter()
        .map(|(name, from)| (name.clone(), from.len()))
        .collect();

    let mut ready: Vec<String> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(name, _)| name.clone())
        .collect();
    ready.sort();

    let mut order = Vec::with_capacity(nodes.len());
    let mut waves = Vec::new();
    while !ready.is_empty() {
        order.extend(ready.iter().cloned());
        let mut next = Vec::new();
        for name in &ready {
            for consumer in consumers.get(name).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(consumer) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(consumer.clone());
                    }
                }
            }
        }
        next.sort();
        waves.push(std::mem::take(&mut ready));
        ready = next;
    }

    if order.len() != nodes.len() {
        return Err(ResolveError::CyclicDependency {
            members: extract_cycle(nodes, &consumers),
        });
    }

    Ok(DagPlan {
        order,
        waves,
        consumers,
        producers,
        boundary_inputs,
    })
}

/// DFS with a recursion stack to extract the actual cycle path for the
/// error message. Only called after Kahn's algorithm proved a cycle exists.
fn extract_cycle(
    nodes: &[Arc<dyn Node>],
    consumers: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let mut names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
    names.sort_unstable();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();
    for name in names {
        if !visited.contains(name) {
            if let Some(cycle) =
                dfs_cycle(name, consumers, &mut visited, &mut rec_stack, &mut path)
            {
                return cycle;
            }
        }
    }
    Vec::new()
}

fn dfs_cycle(
    node: &str,
    consumers: &HashMap<String, Vec<String>>,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(next) = consumers.get(node) {
        for neighbor in next {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle(neighbor, consumers, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let start = path.iter().position(|n| n == neighbor)?;
                let mut cycle = path[start..].to_vec();
                cycle.push(neighbor.clone());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubNode;

    fn node(name: &str, inputs: &[&str], output: &str) -> Arc<dyn Node> {
        Arc::new(StubNode::new(name, inputs, output))
    }

    fn dag(nodes: Vec<Arc<dyn Node>>) -> Dag {
        Dag::new(nodes).unwrap()
    }

    #[test]
    fn linear_chain_resolves_in_order() {
        // X produces d1; Y consumes d1, produces d2; Z consumes d2
        let plan = resolve(&dag(vec![
            node("z", &["d2"], "d3"),
            node("x", &["raw"], "d1"),
            node("y", &["d1"], "d2"),
        ]))
        .unwrap();

        assert_eq!(plan.order(), ["x", "y", "z"]);
        assert_eq!(plan.waves().len(), 3);
    }

    #[test]
    fn every_producer_precedes_every_consumer() {
        let nodes = vec![
            node("a", &["ext1"], "d1"),
            node("b", &["d1", "ext2"], "d2"),
            node("c", &["d1"], "d3"),
            node("d", &["d2", "d3"], "d4"),
            node("e", &["ext3"], "d5"),
        ];
        let plan = resolve(&dag(nodes.clone())).unwrap();

        let position: HashMap<&str, usize> = plan
            .order()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        for (producer, consumer) in crate::graph::edges(&nodes) {
            assert!(
                position[producer.as_str()] < position[consumer.as_str()],
                "{} must precede {}",
                producer,
                consumer
            );
        }
    }

    #[test]
    fn resolution_is_deterministic_regardless_of_input_order() {
        let forward = resolve(&dag(vec![
            node("alpha", &["ext"], "d1"),
            node("beta", &["ext"], "d2"),
            node("gamma", &["d1", "d2"], "d3"),
        ]))
        .unwrap();
        let reversed = resolve(&dag(vec![
            node("gamma", &["d1", "d2"], "d3"),
            node("beta", &["ext"], "d2"),
            node("alpha", &["ext"], "d1"),
        ]))
        .unwrap();

        assert_eq!(forward.order(), reversed.order());
        // Ties break by name ascending.
        assert_eq!(forward.order(), ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn independent_nodes_share_a_wave() {
        let plan = resolve(&dag(vec![
            node("left", &["ext1"], "d1"),
            node("right", &["ext2"], "d2"),
        ]))
        .unwrap();

        assert_eq!(plan.waves().len(), 1);
        assert_eq!(plan.waves()[0], ["left", "right"]);
    }

    #[test]
    fn diamond_produces_three_waves() {
        let plan = resolve(&dag(vec![
            node("source", &["ext"], "d0"),
            node("left", &["d0"], "d1"),
            node("right", &["d0"], "d2"),
            node("sink", &["d1", "d2"], "d3"),
        ]))
        .unwrap();

        assert_eq!(
            plan.waves(),
            [
                vec!["source".to_string()],
                vec!["left".to_string(), "right".to_string()],
                vec!["sink".to_string()],
            ]
        );
        assert_eq!(plan.producers_of("sink"), ["left", "right"]);
    }

    #[test]
    fn unproduced_inputs_are_boundary_not_errors() {
        let plan = resolve(&dag(vec![
            node("a", &["external_table"], "d1"),
            node("b", &["d1", "reference_data"], "d2"),
        ]))
        .unwrap();

        let boundary: Vec<&str> = plan.boundary_inputs().iter().map(String::as_str).collect();
        assert_eq!(boundary, ["external_table", "reference_data"]);
    }

    #[test]
    fn cycle_is_rejected_with_members_named() {
        // a consumes b's output and b consumes a's output
        let err = resolve(&dag(vec![
            node("a", &["d2"], "d1"),
            node("b", &["d1"], "d2"),
        ]))
        .unwrap_err();

        let ResolveError::CyclicDependency { members } = err;
        assert_eq!(members.first(), members.last());
        assert!(members.contains(&"a".to_string()));
        assert!(members.contains(&"b".to_string()));
    }

    #[test]
    fn cycle_behind_a_valid_prefix_is_still_found() {
        let err = resolve(&dag(vec![
            node("entry", &["ext"], "d0"),
            node("a", &["d0", "d3"], "d1"),
            node("b", &["d1"], "d2"),
            node("c", &["d2"], "d3"),
        ]))
        .unwrap_err();

        let ResolveError::CyclicDependency { members } = err;
        assert!(members.len() >= 4);
        assert!(!members.contains(&"entry".to_string()));
    }

    #[test]
    fn downstream_closure_is_transitive() {
        let plan = resolve(&dag(vec![
            node("x", &["ext"], "d1"),
            node("y", &["d1"], "d2"),
            node("z", &["d2"], "d3"),
            node("other", &["ext2"], "d9"),
        ]))
        .unwrap();

        let downstream = plan.downstream_of("x");
        assert_eq!(
            downstream.iter().map(String::as_str).collect::<Vec<_>>(),
            ["y", "z"]
        );
        assert!(plan.downstream_of("other").is_empty());
    }

    #[test]
    fn duplicate_names_rejected_at_assembly() {
        let err = Dag::new(vec![
            node("same", &["a"], "d1"),
            node("same", &["b"], "d2"),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateNodeName { .. }));
    }

    #[test]
    fn duplicate_outputs_rejected_at_assembly() {
        let err = Dag::new(vec![
            node("first", &["a"], "shared"),
            node("second", &["b"], "shared"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateOutputDataset {
                first: "first".to_string(),
                second: "second".to_string(),
                dataset: "shared".to_string()
            }
        );
    }

    #[test]
    fn source_nodes_resolve_into_wave_zero() {
        let plan = resolve(&dag(vec![
            Arc::new(StubNode::source("ingest", "raw")) as Arc<dyn Node>,
            node("clean", &["raw"], "cleaned"),
        ]))
        .unwrap();

        assert_eq!(plan.waves()[0], ["ingest"]);
        assert!(plan.boundary_inputs().is_empty());
    }
}
