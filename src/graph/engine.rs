//! The live graph instance.
//!
//! `GraphEngine` wraps a petgraph `StableUnGraph` and adds an id index,
//! per-element visual state, layout animation and a viewport. UI code only
//! talks to this type; petgraph and the layout engine stay behind it.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::config::GraphConfig;
use super::error::GraphError;
use super::export::{self, GraphDocument, RasterScene};
use super::layout::{self, LayoutAnimation, LayoutInput, LayoutName};
use super::style::{EdgeStyle, NodeStyle};
use super::types::{
	EdgeRecord, ElementDetail, Gender, GraphData, NodeDetail, NodeRecord, Point, RelationshipFilter,
};
use super::viewport::{Bounds, Surface, ViewTransform, Viewport};

/// Index of a node inside the engine. Stable across removals.
pub type NodeId = NodeIndex;

#[derive(Debug, Clone)]
struct Person {
	record: NodeRecord,
	position: Point,
	style: NodeStyle,
}

#[derive(Debug, Clone)]
struct Relationship {
	record: EdgeRecord,
	style: EdgeStyle,
}

/// Read-only view of a node for drawing.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
	/// Engine index.
	pub index: NodeId,
	/// Data.
	pub record: &'a NodeRecord,
	/// Graph-space position.
	pub position: Point,
	/// Visual state.
	pub style: NodeStyle,
}

/// Read-only view of an edge for drawing.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
	/// Data.
	pub record: &'a EdgeRecord,
	/// Source position.
	pub from: Point,
	/// Target position.
	pub to: Point,
	/// Visual state.
	pub style: EdgeStyle,
}

/// The adapter around the live graph.
///
/// Obtained only from [`GraphEngine::initialize`] or
/// [`GraphEngine::from_document`]; holding one means the graph is Ready.
#[derive(Debug)]
pub struct GraphEngine {
	graph: StableUnGraph<Person, Relationship>,
	node_index: HashMap<String, NodeId>,
	edge_index: HashMap<String, EdgeIndex>,
	layout: LayoutName,
	animation: Option<LayoutAnimation>,
	filter: RelationshipFilter,
	viewport: Viewport,
	surface: Surface,
	config: GraphConfig,
}

impl GraphEngine {
	/// Builds the live graph from the data source and runs the initial
	/// force-directed layout.
	///
	/// Fails only when the surface cannot be drawn on. Malformed records
	/// are skipped with a warning.
	pub fn initialize(data: GraphData, surface: Surface, config: GraphConfig) -> Result<Self, GraphError> {
		let mut engine = Self::build(data, surface, config)?;
		engine.place(LayoutName::Cose);
		engine.fit_all();
		info!(
			"graph ready: {} nodes, {} edges",
			engine.node_count(),
			engine.edge_count()
		);
		Ok(engine)
	}

	/// Rebuilds a graph from an exported document, keeping its positions.
	pub fn from_document(
		document: GraphDocument,
		surface: Surface,
		config: GraphConfig,
	) -> Result<Self, GraphError> {
		let positions: Vec<(String, Option<Point>)> = document
			.elements
			.nodes
			.iter()
			.map(|n| (n.data.id.clone(), n.position))
			.collect();
		let layout = document.layout.parse::<LayoutName>().unwrap_or_default();
		let (zoom, pan) = (document.zoom, document.pan);

		let mut engine = Self::build(GraphData::from(document), surface, config)?;
		engine.layout = layout;
		let mut missing = Vec::new();
		for (id, position) in positions {
			match (engine.node_index.get(&id), position) {
				(Some(&index), Some(p)) if p.is_finite() => engine.graph[index].position = p,
				(Some(&index), _) => missing.push(index),
				(None, _) => {}
			}
		}
		engine.seed_unplaced(&missing);
		if zoom.is_finite() && zoom > 0.0 && pan.is_finite() {
			engine.viewport.set(ViewTransform {
				x: pan.x,
				y: pan.y,
				k: zoom,
			});
		} else {
			engine.fit_all();
		}
		info!("graph restored from document: {} nodes", engine.node_count());
		Ok(engine)
	}

	fn build(data: GraphData, surface: Surface, config: GraphConfig) -> Result<Self, GraphError> {
		surface.validate()?;
		let mut engine = Self {
			graph: StableUnGraph::default(),
			node_index: HashMap::new(),
			edge_index: HashMap::new(),
			layout: LayoutName::default(),
			animation: None,
			filter: RelationshipFilter::all(),
			viewport: Viewport::default(),
			surface,
			config,
		};

		let total = data.nodes.len().max(1);
		let center = surface.center();
		for (i, node) in data.nodes.into_iter().enumerate() {
			if node.id.is_empty() {
				warn!("skipping node without id");
				continue;
			}
			if engine.contains(&node.id) {
				warn!("skipping duplicate element id `{}`", node.id);
				continue;
			}
			let angle = i as f64 * std::f64::consts::TAU / total as f64;
			let seed = Point::new(center.x + 100.0 * angle.cos(), center.y + 100.0 * angle.sin());
			engine.insert_node(node, seed);
		}

		for edge in data.edges {
			let endpoints = (
				engine.node_index.get(&edge.source).copied(),
				engine.node_index.get(&edge.target).copied(),
			);
			let (Some(a), Some(b)) = endpoints else {
				warn!(
					"skipping edge {} -> {}: endpoint does not exist",
					edge.source, edge.target
				);
				continue;
			};
			engine.insert_edge(a, b, edge);
		}
		Ok(engine)
	}

	fn insert_node(&mut self, record: NodeRecord, position: Point) -> NodeId {
		let id = record.id.clone();
		let index = self.graph.add_node(Person {
			record,
			position,
			style: NodeStyle::default(),
		});
		self.node_index.insert(id, index);
		index
	}

	fn insert_edge(&mut self, a: NodeId, b: NodeId, mut record: EdgeRecord) {
		record.id = self.edge_id_for(&record);
		let style = EdgeStyle {
			opacity: self.opacity_for(&record),
			on_path: false,
		};
		let id = record.id.clone();
		let index = self.graph.add_edge(a, b, Relationship { record, style });
		self.edge_index.insert(id, index);
	}

	/// Keeps a supplied id when free, otherwise derives `source-target`,
	/// then `source-target:relationship`, then a numeric suffix.
	fn edge_id_for(&self, record: &EdgeRecord) -> String {
		if !record.id.is_empty() && !self.contains(&record.id) {
			return record.id.clone();
		}
		let base = format!("{}-{}", record.source, record.target);
		if !self.contains(&base) {
			return base;
		}
		let typed = format!("{base}:{}", record.relationship);
		if !self.contains(&typed) {
			return typed;
		}
		let mut n = 2;
		loop {
			let candidate = format!("{typed}#{n}");
			if !self.contains(&candidate) {
				return candidate;
			}
			n += 1;
		}
	}

	fn opacity_for(&self, record: &EdgeRecord) -> f64 {
		if self.filter.matches(&record.relationship) {
			1.0
		} else {
			self.config.dimmed_opacity
		}
	}

	/// Whether any node or edge uses `id`.
	pub fn contains(&self, id: &str) -> bool {
		self.node_index.contains_key(id) || self.edge_index.contains_key(id)
	}

	/// Number of people.
	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	/// Number of relationships.
	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// Layout used by the next automatic re-run.
	pub fn layout(&self) -> LayoutName {
		self.layout
	}

	/// Active relationship filter.
	pub fn filter(&self) -> &RelationshipFilter {
		&self.filter
	}

	/// Engine tuning.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Pan/zoom state.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Drawing surface.
	pub fn surface(&self) -> Surface {
		self.surface
	}

	/// Whether a layout transition or fit is still running.
	pub fn is_animating(&self) -> bool {
		self.animation.is_some() || self.viewport.fit_target().is_some()
	}

	/// Adds a person and re-runs the current layout.
	///
	/// Returns `false`, changing nothing, when `id` is empty or taken.
	pub fn add_node(&mut self, id: &str, gender: Gender) -> bool {
		if id.is_empty() {
			debug!("add_node ignored: empty id");
			return false;
		}
		if self.contains(id) {
			debug!("add_node ignored: `{id}` already exists");
			return false;
		}
		let seed = self.spawn_point();
		self.insert_node(NodeRecord::new(id, gender), seed);
		info!("added node `{id}`");
		self.start_layout(self.layout);
		true
	}

	/// Spreads `unplaced` nodes around the centre of the placed ones.
	fn seed_unplaced(&mut self, unplaced: &[NodeId]) {
		if unplaced.is_empty() {
			return;
		}
		let placed = self
			.graph
			.node_indices()
			.filter(|i| !unplaced.contains(i))
			.map(|i| self.graph[i].position);
		let center = Bounds::around(placed, 0.0)
			.map(|b| b.center())
			.unwrap_or_else(|| self.surface.center());
		let ring = self.config.spacing;
		for (n, &index) in unplaced.iter().enumerate() {
			let angle = n as f64 * 2.399_963; // golden angle
			self.graph[index].position = Point::new(
				center.x + ring * angle.cos(),
				center.y + ring * angle.sin(),
			);
		}
		debug!("seeded {} nodes without a stored position", unplaced.len());
	}

	/// Near the middle of the graph, nudged so it never sits on another node.
	fn spawn_point(&self) -> Point {
		let center = Bounds::around(self.graph.node_weights().map(|p| p.position), 0.0)
			.map(|b| b.center())
			.unwrap_or_else(|| self.viewport.screen_to_graph(self.surface.width / 2.0, self.surface.height / 2.0));
		let n = self.graph.node_count() as f64;
		let angle = n * 2.399_963; // golden angle
		Point::new(
			center.x + self.config.node_radius * angle.cos(),
			center.y + self.config.node_radius * angle.sin(),
		)
	}

	/// Removes a person and every incident relationship.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let Some(index) = self.node_index.remove(id) else {
			debug!("remove_node ignored: `{id}` not found");
			return false;
		};
		let incident: Vec<String> = self
			.graph
			.edges(index)
			.map(|e| e.weight().record.id.clone())
			.collect();
		for edge_id in &incident {
			self.edge_index.remove(edge_id);
		}
		self.graph.remove_node(index);
		if let Some(animation) = self.animation.as_mut() {
			animation.release(index);
		}
		info!("removed node `{id}` and {} edges", incident.len());
		true
	}

	/// Places a node, e.g. while it is dragged.
	pub fn move_node(&mut self, index: NodeId, position: Point) {
		if !position.is_finite() {
			return;
		}
		if let Some(person) = self.graph.node_weight_mut(index) {
			person.position = position;
			if let Some(animation) = self.animation.as_mut() {
				animation.release(index);
			}
		}
	}

	/// Current position of a node.
	pub fn node_position(&self, index: NodeId) -> Option<Point> {
		self.graph.node_weight(index).map(|p| p.position)
	}

	/// Data of a node.
	pub fn node_record(&self, index: NodeId) -> Option<&NodeRecord> {
		self.graph.node_weight(index).map(|p| &p.record)
	}

	/// Index of the node with `id`.
	pub fn node_id(&self, id: &str) -> Option<NodeId> {
		self.node_index.get(id).copied()
	}

	/// Detail for the element with `id`, computed from the current graph.
	pub fn query_element(&self, id: &str) -> Option<ElementDetail> {
		if let Some(&index) = self.node_index.get(id) {
			return Some(ElementDetail::Node(self.node_detail(index)));
		}
		let &edge = self.edge_index.get(id)?;
		self.graph
			.edge_weight(edge)
			.map(|r| ElementDetail::Edge(r.record.clone()))
	}

	fn node_detail(&self, index: NodeId) -> NodeDetail {
		let mut seen_edges = HashSet::new();
		let mut seen_nodes = HashSet::new();
		let mut connected_edges = Vec::new();
		let mut connected_nodes = Vec::new();
		for edge in self.graph.edges(index) {
			if !seen_edges.insert(edge.id()) {
				continue;
			}
			connected_edges.push(edge.weight().record.clone());
			let other = if edge.source() == index {
				edge.target()
			} else {
				edge.source()
			};
			if other != index && seen_nodes.insert(other) {
				connected_nodes.push(self.graph[other].record.clone());
			}
		}
		connected_edges.sort_by(|a, b| a.id.cmp(&b.id));
		connected_nodes.sort_by(|a, b| a.id.cmp(&b.id));
		NodeDetail {
			node: self.graph[index].record.clone(),
			connected_nodes,
			connected_edges,
		}
	}

	/// Node under a screen position.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let p = self.viewport.screen_to_graph(sx, sy);
		self.graph
			.node_indices()
			.filter_map(|i| {
				let d = self.graph[i].position.distance(p);
				(d <= self.config.node_radius).then_some((i, d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	/// Id of the element under a screen position. Nodes win over edges.
	pub fn element_at(&self, sx: f64, sy: f64) -> Option<String> {
		if let Some(index) = self.node_at(sx, sy) {
			return Some(self.graph[index].record.id.clone());
		}
		let p = self.viewport.screen_to_graph(sx, sy);
		let tolerance = self.config.edge_hit_tolerance / self.viewport.transform().k;
		self.graph
			.edge_references()
			.filter_map(|e| {
				let a = self.graph[e.source()].position;
				let b = self.graph[e.target()].position;
				let d = distance_to_segment(p, a, b);
				(d <= tolerance).then_some((e.weight().record.id.clone(), d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id)
	}

	/// Clears every node border, then borders `id` and animates the view
	/// onto it. Empty or unknown ids only clear.
	pub fn set_highlight(&mut self, id: &str) -> bool {
		for person in self.graph.node_weights_mut() {
			person.style.border_width = 0.0;
		}
		if id.is_empty() {
			return false;
		}
		let Some(&index) = self.node_index.get(id) else {
			debug!("{}", GraphError::NotFound(id.to_string()));
			return false;
		};
		self.graph[index].style.border_width = self.config.highlight_border_width;

		let position = self
			.animation
			.as_ref()
			.and_then(|a| a.target(index))
			.unwrap_or(self.graph[index].position);
		if let Some(bounds) = Bounds::around([position], self.config.node_radius) {
			let target = Viewport::fitting(
				&bounds,
				&self.surface,
				self.config.fit_padding,
				self.config.max_fit_zoom,
			);
			self.viewport.animate_to(target, self.config.fit_duration);
		}
		true
	}

	/// Re-applies edge opacity for the whole edge set.
	pub fn set_relationship_filter(&mut self, filter: RelationshipFilter) {
		self.filter = filter;
		let dimmed = self.config.dimmed_opacity;
		for relationship in self.graph.edge_weights_mut() {
			relationship.style.opacity = if self.filter.matches(&relationship.record.relationship) {
				1.0
			} else {
				dimmed
			};
		}
		debug!("relationship filter set to `{}`", self.filter.as_str());
	}

	/// Fewest-hop path between two people, as alternating node and edge ids.
	///
	/// Path marks are cleared first; the new path, if any, is marked.
	pub fn find_shortest_path(&mut self, source: &str, target: &str) -> Vec<String> {
		self.clear_path_marks();
		let (nodes, edges) = match self.path_between(source, target) {
			Ok(path) => path,
			Err(err) => {
				debug!("no shortest path: {err}");
				return Vec::new();
			}
		};

		let mut ids = Vec::with_capacity(nodes.len() + edges.len());
		for (i, &node) in nodes.iter().enumerate() {
			self.graph[node].style.on_path = true;
			ids.push(self.graph[node].record.id.clone());
			if let Some(&edge) = edges.get(i) {
				self.graph[edge].style.on_path = true;
				ids.push(self.graph[edge].record.id.clone());
			}
		}
		debug!("shortest path {source} -> {target}: {} hops", edges.len());
		ids
	}

	fn path_between(&self, source: &str, target: &str) -> Result<(Vec<NodeId>, Vec<EdgeIndex>), GraphError> {
		let from = self.node_id(source).ok_or_else(|| GraphError::NotFound(source.to_string()))?;
		let to = self.node_id(target).ok_or_else(|| GraphError::NotFound(target.to_string()))?;
		let (_, nodes) = petgraph::algo::astar(&self.graph, from, |n| n == to, |_| 1u32, |_| 0u32)
			.ok_or_else(|| GraphError::NotFound(format!("path {source} -> {target}")))?;
		let edges = nodes
			.windows(2)
			.map(|pair| {
				self.graph
					.find_edge(pair[0], pair[1])
					.ok_or_else(|| GraphError::NotFound(format!("edge {:?} -> {:?}", pair[0], pair[1])))
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok((nodes, edges))
	}

	/// Drops every shortest-path mark.
	pub fn clear_path_marks(&mut self) {
		for person in self.graph.node_weights_mut() {
			person.style.on_path = false;
		}
		for relationship in self.graph.edge_weights_mut() {
			relationship.style.on_path = false;
		}
	}

	/// Re-positions every node with the named layout, animated.
	///
	/// Unknown names fall back to the current layout.
	pub fn run_layout(&mut self, name: &str) {
		let layout = match name.parse::<LayoutName>() {
			Ok(layout) => layout,
			Err(err) => {
				warn!("{err}, re-running {}", self.layout);
				self.layout
			}
		};
		self.start_layout(layout);
	}

	fn start_layout(&mut self, layout: LayoutName) {
		self.layout = layout;
		let from: HashMap<NodeId, Point> = self
			.graph
			.node_indices()
			.map(|i| (i, self.graph[i].position))
			.collect();
		let to = self.layout_targets(layout);
		self.animation = Some(LayoutAnimation::new(from, to, self.config.layout_duration));
	}

	/// Moves every node straight to its layout position.
	fn place(&mut self, layout: LayoutName) {
		self.layout = layout;
		self.animation = None;
		for (index, p) in self.layout_targets(layout) {
			if let Some(person) = self.graph.node_weight_mut(index) {
				person.position = p;
			}
		}
	}

	fn layout_targets(&self, layout: LayoutName) -> HashMap<NodeId, Point> {
		let nodes: Vec<(NodeId, Point)> = self
			.graph
			.node_indices()
			.map(|i| (i, self.graph[i].position))
			.collect();
		let edges: Vec<(NodeId, NodeId)> = self
			.graph
			.edge_references()
			.map(|e| (e.source(), e.target()))
			.collect();
		let center = Bounds::around(nodes.iter().map(|(_, p)| *p), 0.0)
			.map(|b| b.center())
			.unwrap_or_else(|| self.surface.center());
		layout::compute(
			layout,
			&LayoutInput {
				nodes: &nodes,
				edges: &edges,
				center,
			},
			&self.config,
		)
	}

	/// Advances layout and viewport animations by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		if let Some(animation) = self.animation.as_mut() {
			let (positions, finished) = animation.advance(dt);
			for (index, p) in positions {
				if let Some(person) = self.graph.node_weight_mut(index) {
					person.position = p;
				}
			}
			if finished {
				self.animation = None;
			}
		}
		self.viewport.tick(dt);
	}

	/// Drags the view.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.viewport.pan_by(dx, dy);
	}

	/// Zooms around a screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.viewport.zoom_at(sx, sy, factor);
	}

	/// Follows a resized canvas. Unusable sizes are ignored.
	pub fn resize(&mut self, width: f64, height: f64) {
		let surface = Surface::new(width, height);
		if surface.validate().is_ok() {
			self.surface = surface;
		}
	}

	/// Frames every node in the view.
	pub fn fit_all(&mut self) {
		let bounds = Bounds::around(
			self.graph.node_weights().map(|p| p.position),
			self.config.node_radius,
		);
		if let Some(bounds) = bounds {
			self.viewport.set(Viewport::fitting(
				&bounds,
				&self.surface,
				self.config.fit_padding,
				self.config.max_fit_zoom,
			));
		}
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
		self.graph.node_indices().map(|index| {
			let person = &self.graph[index];
			NodeView {
				index,
				record: &person.record,
				position: person.position,
				style: person.style,
			}
		})
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
		self.graph.edge_references().map(|e| EdgeView {
			record: &e.weight().record,
			from: self.graph[e.source()].position,
			to: self.graph[e.target()].position,
			style: e.weight().style,
		})
	}

	/// Renders the full graph (not just the viewport) to PNG bytes.
	pub fn export_raster(&self) -> Result<Vec<u8>, GraphError> {
		let scene = RasterScene {
			nodes: self.nodes().collect(),
			edges: self.edges().collect(),
		};
		let png = export::rasterize(&scene, &self.config)?;
		info!("exported {} byte PNG", png.len());
		Ok(png)
	}

	/// Snapshot of the data and positions; visual-only state is left out.
	pub fn export_document(&self) -> GraphDocument {
		let transform = self.viewport.transform();
		GraphDocument::new(
			self.nodes().map(|n| (n.record.clone(), n.position)),
			self.edges().map(|e| e.record.clone()),
			transform.k,
			Point::new(transform.x, transform.y),
			self.layout,
		)
	}
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::RelationshipKind;

	fn people() -> GraphData {
		GraphData {
			nodes: vec![
				NodeRecord::new("A", Gender::Male),
				NodeRecord::new("B", Gender::Female),
				NodeRecord::new("C", Gender::Male),
			],
			edges: vec![
				EdgeRecord::new("A", "B", "CURRENT_PARTNER"),
				EdgeRecord::new("B", "C", "EX_PARTNER"),
			],
		}
	}

	fn engine(data: GraphData) -> GraphEngine {
		GraphEngine::initialize(data, Surface::new(800.0, 600.0), GraphConfig::default()).unwrap()
	}

	fn opacity(engine: &GraphEngine, id: &str) -> f64 {
		engine.edges().find(|e| e.record.id == id).unwrap().style.opacity
	}

	#[test]
	fn invalid_surface_fails_initialization() {
		let result = GraphEngine::initialize(people(), Surface::new(0.0, 0.0), GraphConfig::default());
		assert!(matches!(result, Err(GraphError::Initialization(_))));
	}

	#[test]
	fn malformed_records_are_skipped() {
		let mut data = people();
		data.nodes.push(NodeRecord::new("A", Gender::Female));
		data.nodes.push(NodeRecord::new("", Gender::Female));
		data.edges.push(EdgeRecord::new("A", "Nobody", "AFFECTION"));
		let engine = engine(data);
		assert_eq!(engine.node_count(), 3);
		assert_eq!(engine.edge_count(), 2);
		assert_eq!(engine.node_record(engine.node_id("A").unwrap()).unwrap().gender, Gender::Male);
	}

	#[test]
	fn edge_ids_are_derived_and_unique() {
		let mut data = people();
		data.edges.push(EdgeRecord::new("A", "B", "AFFECTION"));
		data.edges.push(EdgeRecord::new("A", "B", "AFFECTION"));
		let engine = engine(data);
		let ids: Vec<&str> = engine.edges().map(|e| e.record.id.as_str()).collect();
		assert_eq!(ids, ["A-B", "B-C", "A-B:AFFECTION", "A-B:AFFECTION#2"]);
	}

	#[test]
	fn node_detail_lists_each_incident_edge_once() {
		let engine = engine(people());
		let Some(ElementDetail::Node(detail)) = engine.query_element("B") else {
			panic!("B should be a node");
		};
		assert_eq!(detail.node.gender, Gender::Female);
		let neighbours: Vec<&str> = detail.connected_nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(neighbours, ["A", "C"]);
		assert_eq!(detail.connected_edges.len(), 2);
		assert_eq!(detail.connected_nodes.len(), detail.connected_edges.len());
	}

	#[test]
	fn self_loop_is_not_its_own_neighbour() {
		let mut data = people();
		data.edges.push(EdgeRecord::new("A", "A", "AFFECTION"));
		let engine = engine(data);
		let Some(ElementDetail::Node(detail)) = engine.query_element("A") else {
			panic!("A should be a node");
		};
		let neighbours: Vec<&str> = detail.connected_nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(neighbours, ["B"]);
		assert_eq!(detail.connected_edges.len(), 2);
	}

	#[test]
	fn document_keeps_stored_positions_when_some_are_missing() {
		let mut document = engine(people()).export_document();
		let stored: Vec<Option<Point>> = document.elements.nodes.iter().map(|n| n.position).collect();
		document.elements.nodes[1].position = None;

		let restored =
			GraphEngine::from_document(document, Surface::new(800.0, 600.0), GraphConfig::default())
				.unwrap();
		let positions: Vec<Point> = restored.nodes().map(|n| n.position).collect();
		assert_eq!(Some(positions[0]), stored[0]);
		assert_eq!(Some(positions[2]), stored[2]);
		assert!(positions[1].is_finite());
		assert!(positions[1].distance(positions[0]) > 0.0);
	}

	#[test]
	fn edges_are_queryable_by_id() {
		let engine = engine(people());
		let Some(ElementDetail::Edge(edge)) = engine.query_element("B-C") else {
			panic!("B-C should be an edge");
		};
		assert_eq!(edge.relationship, RelationshipKind::ExPartner);
		assert!(engine.query_element("nope").is_none());
	}

	#[test]
	fn add_node_rejects_empty_and_duplicate_ids() {
		let mut engine = engine(people());
		assert!(!engine.add_node("", Gender::Male));
		assert!(!engine.add_node("A", Gender::Female));
		assert!(!engine.add_node("A-B", Gender::Female));
		assert!(engine.add_node("D", Gender::Female));
		assert_eq!(engine.node_count(), 4);
		assert!(engine.is_animating());
	}

	#[test]
	fn remove_node_drops_incident_edges() {
		let mut engine = engine(people());
		assert!(engine.remove_node("B"));
		assert_eq!(engine.edge_count(), 0);
		assert!(engine.query_element("A-B").is_none());
		assert!(!engine.remove_node("B"));
		let Some(ElementDetail::Node(detail)) = engine.query_element("A") else {
			panic!("A should remain");
		};
		assert!(detail.connected_edges.is_empty());
	}

	#[test]
	fn highlight_borders_only_resolved_node() {
		let mut engine = engine(people());
		assert!(engine.set_highlight("A"));
		let bordered: Vec<&str> = engine
			.nodes()
			.filter(|n| n.style.border_width > 0.0)
			.map(|n| n.record.id.as_str())
			.collect();
		assert_eq!(bordered, ["A"]);
		assert!(engine.viewport().fit_target().is_some());

		assert!(!engine.set_highlight("Z"));
		assert!(engine.nodes().all(|n| n.style.border_width == 0.0));
	}

	#[test]
	fn filter_dims_non_matching_edges_idempotently() {
		let mut engine = engine(people());
		engine.set_relationship_filter(RelationshipFilter::parse("EX_PARTNER"));
		let once = (opacity(&engine, "A-B"), opacity(&engine, "B-C"));
		engine.set_relationship_filter(RelationshipFilter::parse("EX_PARTNER"));
		assert_eq!(once, (opacity(&engine, "A-B"), opacity(&engine, "B-C")));
		assert_eq!(once, (0.1, 1.0));

		engine.set_relationship_filter(RelationshipFilter::all());
		assert_eq!(opacity(&engine, "A-B"), 1.0);
	}

	#[test]
	fn shortest_path_alternates_nodes_and_edges() {
		let mut engine = engine(people());
		assert_eq!(engine.find_shortest_path("A", "C"), ["A", "A-B", "B", "B-C", "C"]);
		assert!(engine.nodes().all(|n| n.style.on_path));
		assert!(engine.edges().all(|e| e.style.on_path));

		assert_eq!(engine.find_shortest_path("C", "C"), ["C"]);
		let marked: Vec<&str> = engine
			.nodes()
			.filter(|n| n.style.on_path)
			.map(|n| n.record.id.as_str())
			.collect();
		assert_eq!(marked, ["C"]);
		assert!(engine.edges().all(|e| !e.style.on_path));
	}

	#[test]
	fn unreachable_path_is_empty_and_clears_marks() {
		let mut engine = engine(people());
		engine.find_shortest_path("A", "C");
		engine.add_node("D", Gender::Female);
		assert!(engine.find_shortest_path("A", "D").is_empty());
		assert!(engine.nodes().all(|n| !n.style.on_path));
		assert!(engine.edges().all(|e| !e.style.on_path));
		assert!(engine.find_shortest_path("A", "missing").is_empty());
	}

	#[test]
	fn layout_animation_settles_within_duration() {
		let mut engine = engine(people());
		engine.run_layout("grid");
		assert_eq!(engine.layout(), LayoutName::Grid);
		for _ in 0..40 {
			engine.tick(0.016);
		}
		assert!(!engine.is_animating());

		engine.run_layout("spiral");
		assert_eq!(engine.layout(), LayoutName::Grid);
	}

	#[test]
	fn hit_testing_prefers_nodes() {
		let mut engine = engine(people());
		let a = engine.node_id("A").unwrap();
		let b = engine.node_id("B").unwrap();
		let c = engine.node_id("C").unwrap();
		engine.move_node(a, Point::new(0.0, 0.0));
		engine.move_node(b, Point::new(200.0, 0.0));
		engine.move_node(c, Point::new(200.0, 400.0));
		engine.viewport.set(Default::default());

		assert_eq!(engine.element_at(1.0, 1.0).as_deref(), Some("A"));
		assert_eq!(engine.element_at(100.0, 2.0).as_deref(), Some("A-B"));
		assert_eq!(engine.element_at(100.0, 80.0), None);
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(10.0, 0.0);
		assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
		assert_eq!(distance_to_segment(Point::new(-4.0, 3.0), a, b), 5.0);
	}
}
