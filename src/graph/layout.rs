//! Layout algorithms and the animated transition between layouts.
//!
//! Every layout computes target positions up front; [`LayoutAnimation`]
//! then tweens nodes from where they are towards those targets, so a
//! layout run always finishes within the configured duration.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};
use petgraph::stable_graph::NodeIndex;

use super::config::GraphConfig;
use super::types::Point;
use super::viewport::ease_out_cubic;

/// Named layout algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutName {
	/// Force-directed.
	#[default]
	Cose,
	/// Nodes evenly spaced on a circle.
	Circle,
	/// Nodes in a square-ish grid.
	Grid,
	/// Breadth-first tree rows rooted at each component's best-connected node.
	Breadthfirst,
}

impl LayoutName {
	/// Every layout, in menu order.
	pub const ALL: [LayoutName; 4] = [
		LayoutName::Cose,
		LayoutName::Circle,
		LayoutName::Grid,
		LayoutName::Breadthfirst,
	];

	/// Select value.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Cose => "cose",
			Self::Circle => "circle",
			Self::Grid => "grid",
			Self::Breadthfirst => "breadthfirst",
		}
	}

	/// Menu label.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Cose => "Cose",
			Self::Circle => "Circle",
			Self::Grid => "Grid",
			Self::Breadthfirst => "Breadthfirst",
		}
	}
}

impl fmt::Display for LayoutName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned for names outside [`LayoutName::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayout(pub String);

impl fmt::Display for UnknownLayout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown layout `{}`", self.0)
	}
}

impl std::error::Error for UnknownLayout {}

impl FromStr for LayoutName {
	type Err = UnknownLayout;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|l| l.as_str() == s.trim())
			.ok_or_else(|| UnknownLayout(s.to_string()))
	}
}

/// Topology and current positions a layout works from.
pub(crate) struct LayoutInput<'a> {
	pub nodes: &'a [(NodeIndex, Point)],
	pub edges: &'a [(NodeIndex, NodeIndex)],
	pub center: Point,
}

pub(crate) fn compute(
	name: LayoutName,
	input: &LayoutInput<'_>,
	config: &GraphConfig,
) -> HashMap<NodeIndex, Point> {
	if input.nodes.is_empty() {
		return HashMap::new();
	}
	let targets = match name {
		LayoutName::Cose => force_directed(input, config),
		LayoutName::Circle => circle(input, config),
		LayoutName::Grid => grid(input, config),
		LayoutName::Breadthfirst => breadthfirst(input, config),
	};
	debug!("{} layout placed {} nodes", name, targets.len());
	targets
}

#[derive(Clone, Copy, Debug, Default)]
struct Body {
	slot: usize,
}

fn force_directed(input: &LayoutInput<'_>, config: &GraphConfig) -> HashMap<NodeIndex, Point> {
	let p = &config.force;
	let mut graph: ForceGraph<Body, ()> = ForceGraph::new(SimulationParameters {
		force_charge: p.charge,
		force_spring: p.spring,
		force_max: p.max,
		node_speed: p.node_speed,
		damping_factor: p.damping,
	});
	let mut bodies = HashMap::new();

	for (slot, &(index, pos)) in input.nodes.iter().enumerate() {
		let idx = graph.add_node(NodeData {
			x: pos.x as f32,
			y: pos.y as f32,
			mass: 10.0,
			is_anchor: false,
			user_data: Body { slot },
		});
		bodies.insert(index, idx);
	}
	for (a, b) in input.edges {
		if a == b {
			continue;
		}
		if let (Some(&src), Some(&tgt)) = (bodies.get(a), bodies.get(b)) {
			graph.add_edge(src, tgt, EdgeData::default());
		}
	}

	for _ in 0..config.force_iterations {
		graph.update(config.force_step);
	}

	let mut placed = Vec::with_capacity(input.nodes.len());
	graph.visit_nodes(|node| {
		let slot = node.data.user_data.slot;
		placed.push((
			input.nodes[slot].0,
			Point::new(node.x() as f64, node.y() as f64),
		));
	});

	if placed.iter().any(|(_, p)| !p.is_finite()) {
		warn!("force simulation diverged, keeping current positions");
		return input.nodes.iter().copied().collect();
	}
	recenter(placed, input.center)
}

fn recenter(placed: Vec<(NodeIndex, Point)>, center: Point) -> HashMap<NodeIndex, Point> {
	let n = placed.len().max(1) as f64;
	let (sx, sy) = placed
		.iter()
		.fold((0.0, 0.0), |(sx, sy), (_, p)| (sx + p.x, sy + p.y));
	let (dx, dy) = (center.x - sx / n, center.y - sy / n);
	placed
		.into_iter()
		.map(|(i, p)| (i, Point::new(p.x + dx, p.y + dy)))
		.collect()
}

fn circle(input: &LayoutInput<'_>, config: &GraphConfig) -> HashMap<NodeIndex, Point> {
	let n = input.nodes.len();
	if n == 1 {
		return HashMap::from([(input.nodes[0].0, input.center)]);
	}
	let circumference = n as f64 * (2.0 * config.node_radius + config.spacing / 2.0);
	let radius = (circumference / (2.0 * PI)).max(config.spacing);
	input
		.nodes
		.iter()
		.enumerate()
		.map(|(i, &(index, _))| {
			let angle = -PI / 2.0 + i as f64 * 2.0 * PI / n as f64;
			(
				index,
				Point::new(
					input.center.x + radius * angle.cos(),
					input.center.y + radius * angle.sin(),
				),
			)
		})
		.collect()
}

fn grid(input: &LayoutInput<'_>, config: &GraphConfig) -> HashMap<NodeIndex, Point> {
	let n = input.nodes.len();
	let cols = (n as f64).sqrt().ceil().max(1.0) as usize;
	let rows = n.div_ceil(cols);
	let origin = Point::new(
		input.center.x - (cols - 1) as f64 * config.spacing / 2.0,
		input.center.y - (rows - 1) as f64 * config.spacing / 2.0,
	);
	input
		.nodes
		.iter()
		.enumerate()
		.map(|(i, &(index, _))| {
			let (row, col) = (i / cols, i % cols);
			(
				index,
				Point::new(
					origin.x + col as f64 * config.spacing,
					origin.y + row as f64 * config.spacing,
				),
			)
		})
		.collect()
}

fn breadthfirst(input: &LayoutInput<'_>, config: &GraphConfig) -> HashMap<NodeIndex, Point> {
	let mut adjacency: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
	for &(a, b) in input.edges {
		if a != b {
			adjacency.entry(a).or_default().push(b);
			adjacency.entry(b).or_default().push(a);
		}
	}
	let degree = |i: &NodeIndex| adjacency.get(i).map_or(0, Vec::len);

	// One tree per component, rooted at its highest-degree node.
	let mut seen = HashSet::new();
	let mut levels: Vec<Vec<NodeIndex>> = Vec::new();
	for &(start, _) in input.nodes {
		if seen.contains(&start) {
			continue;
		}
		let mut component = vec![start];
		let mut stack = vec![start];
		seen.insert(start);
		while let Some(current) = stack.pop() {
			for &next in adjacency.get(&current).into_iter().flatten() {
				if seen.insert(next) {
					component.push(next);
					stack.push(next);
				}
			}
		}
		let root = component
			.iter()
			.copied()
			.max_by_key(|i| (degree(i), std::cmp::Reverse(i.index())))
			.unwrap_or(start);

		let mut depth_of = HashMap::from([(root, 0usize)]);
		let mut queue = VecDeque::from([root]);
		while let Some(current) = queue.pop_front() {
			let depth = depth_of[&current];
			if levels.len() <= depth {
				levels.resize_with(depth + 1, Vec::new);
			}
			levels[depth].push(current);
			for &next in adjacency.get(&current).into_iter().flatten() {
				if !depth_of.contains_key(&next) {
					depth_of.insert(next, depth + 1);
					queue.push_back(next);
				}
			}
		}
	}

	let top = input.center.y - (levels.len().saturating_sub(1)) as f64 * config.spacing / 2.0;
	let mut targets = HashMap::new();
	for (depth, level) in levels.iter().enumerate() {
		let left = input.center.x - (level.len() - 1) as f64 * config.spacing / 2.0;
		for (i, &index) in level.iter().enumerate() {
			targets.insert(
				index,
				Point::new(
					left + i as f64 * config.spacing,
					top + depth as f64 * config.spacing,
				),
			);
		}
	}
	targets
}

/// A tween from the positions at layout start to the layout's targets.
#[derive(Clone, Debug)]
pub(crate) struct LayoutAnimation {
	from: HashMap<NodeIndex, Point>,
	to: HashMap<NodeIndex, Point>,
	elapsed: f64,
	duration: f64,
}

impl LayoutAnimation {
	pub fn new(from: HashMap<NodeIndex, Point>, to: HashMap<NodeIndex, Point>, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration: duration.max(0.0),
		}
	}

	/// Advances time; returns the interpolated positions and whether the
	/// tween has finished.
	pub fn advance(&mut self, dt: f64) -> (Vec<(NodeIndex, Point)>, bool) {
		self.elapsed += dt;
		let t = if self.duration == 0.0 {
			1.0
		} else {
			(self.elapsed / self.duration).min(1.0)
		};
		let eased = ease_out_cubic(t);
		let positions = self
			.to
			.iter()
			.map(|(&index, &target)| {
				let start = self.from.get(&index).copied().unwrap_or(target);
				let p = if t >= 1.0 { target } else { start.lerp(target, eased) };
				(index, p)
			})
			.collect();
		(positions, t >= 1.0)
	}

	/// Stops animating a node, e.g. while it is being dragged or after removal.
	pub fn release(&mut self, index: NodeIndex) {
		self.from.remove(&index);
		self.to.remove(&index);
	}

	pub fn target(&self, index: NodeIndex) -> Option<Point> {
		self.to.get(&index).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes(n: usize) -> Vec<(NodeIndex, Point)> {
		(0..n)
			.map(|i| (NodeIndex::new(i), Point::new(i as f64 * 10.0, (i % 3) as f64 * 7.0)))
			.collect()
	}

	#[test]
	fn names_parse_and_reject_unknown() {
		for layout in LayoutName::ALL {
			assert_eq!(layout.as_str().parse::<LayoutName>().unwrap(), layout);
		}
		assert_eq!(
			"spiral".parse::<LayoutName>(),
			Err(UnknownLayout("spiral".into()))
		);
	}

	#[test]
	fn grid_places_nodes_on_distinct_cells() {
		let nodes = nodes(5);
		let input = LayoutInput {
			nodes: &nodes,
			edges: &[],
			center: Point::new(0.0, 0.0),
		};
		let config = GraphConfig::default();
		let placed = compute(LayoutName::Grid, &input, &config);
		assert_eq!(placed.len(), 5);
		let cells: HashSet<(i64, i64)> = placed
			.values()
			.map(|p| (p.x.round() as i64, p.y.round() as i64))
			.collect();
		assert_eq!(cells.len(), 5);
	}

	#[test]
	fn circle_keeps_nodes_equidistant_from_center() {
		let nodes = nodes(6);
		let center = Point::new(200.0, 100.0);
		let input = LayoutInput {
			nodes: &nodes,
			edges: &[],
			center,
		};
		let placed = compute(LayoutName::Circle, &input, &GraphConfig::default());
		let radii: Vec<f64> = placed.values().map(|p| p.distance(center)).collect();
		assert!(radii.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-6));
	}

	#[test]
	fn breadthfirst_rows_follow_hop_distance() {
		let nodes = nodes(4);
		let (a, b, c, d) = (nodes[0].0, nodes[1].0, nodes[2].0, nodes[3].0);
		// b is the hub: a-b, b-c, c-d.
		let edges = [(a, b), (b, c), (c, d)];
		let input = LayoutInput {
			nodes: &nodes,
			edges: &edges,
			center: Point::new(0.0, 0.0),
		};
		let placed = compute(LayoutName::Breadthfirst, &input, &GraphConfig::default());
		assert!(placed[&b].y < placed[&a].y);
		assert_eq!(placed[&a].y, placed[&c].y);
		assert!(placed[&c].y < placed[&d].y);
	}

	#[test]
	fn force_layout_is_finite_and_centered() {
		let nodes = nodes(4);
		let edges = [(nodes[0].0, nodes[1].0), (nodes[1].0, nodes[2].0)];
		let center = Point::new(400.0, 300.0);
		let input = LayoutInput {
			nodes: &nodes,
			edges: &edges,
			center,
		};
		let placed = compute(LayoutName::Cose, &input, &GraphConfig::default());
		assert_eq!(placed.len(), 4);
		assert!(placed.values().all(Point::is_finite));
		let mean_x = placed.values().map(|p| p.x).sum::<f64>() / 4.0;
		assert!((mean_x - center.x).abs() < 1e-6);
	}

	#[test]
	fn animation_lands_exactly_on_targets() {
		let i = NodeIndex::new(0);
		let mut anim = LayoutAnimation::new(
			HashMap::from([(i, Point::new(0.0, 0.0))]),
			HashMap::from([(i, Point::new(100.0, 0.0))]),
			0.5,
		);
		let (mid, done) = anim.advance(0.25);
		assert!(!done);
		assert!(mid[0].1.x > 0.0 && mid[0].1.x < 100.0);
		let (end, done) = anim.advance(0.25);
		assert!(done);
		assert_eq!(end[0].1, Point::new(100.0, 0.0));
	}
}
