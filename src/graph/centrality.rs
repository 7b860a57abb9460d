//! Betweenness centrality over the live graph.
//!
//! The engine's graph is converted into a plain undirected graph on every
//! call and handed to `rustworkx-core`; nothing is cached.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use rustworkx_core::centrality::betweenness_centrality;
use rustworkx_core::petgraph::graph::{NodeIndex, UnGraph};

use super::engine::GraphEngine;

/// Below this many nodes the computation stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 200;

/// Normalized betweenness centrality of every person, keyed by id.
pub fn compute_centrality(engine: &GraphEngine) -> BTreeMap<String, f64> {
	let (graph, ids) = to_plain_graph(engine);
	let scores = betweenness_centrality(&graph, false, true, PARALLEL_THRESHOLD);
	let result: BTreeMap<String, f64> = graph
		.node_indices()
		.map(|i| (ids[i.index()].clone(), scores[i.index()].unwrap_or(0.0)))
		.collect();
	debug!("computed centrality for {} nodes", result.len());
	result
}

/// One node per person, one edge per unordered pair of connected people.
fn to_plain_graph(engine: &GraphEngine) -> (UnGraph<(), ()>, Vec<String>) {
	let mut graph = UnGraph::<(), ()>::with_capacity(engine.node_count(), engine.edge_count());
	let mut ids = Vec::with_capacity(engine.node_count());
	let mut by_id: HashMap<&str, NodeIndex> = HashMap::new();
	for node in engine.nodes() {
		let index = graph.add_node(());
		ids.push(node.record.id.clone());
		by_id.insert(node.record.id.as_str(), index);
	}

	let mut pairs = HashSet::new();
	for edge in engine.edges() {
		let (Some(&a), Some(&b)) = (
			by_id.get(edge.record.source.as_str()),
			by_id.get(edge.record.target.as_str()),
		) else {
			continue;
		};
		if a == b {
			continue;
		}
		if pairs.insert((a.min(b), a.max(b))) {
			graph.add_edge(a, b, ());
		}
	}
	(graph, ids)
}
