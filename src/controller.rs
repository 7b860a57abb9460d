//! The view controller: transient UI state plus the single place where user
//! commands turn into engine calls.
//!
//! Every command runs to completion inside [`ViewController::dispatch`].
//! Anything the browser has to do afterwards (downloads, alerts) comes back
//! as a [`SideEffect`] so this module stays free of DOM calls.

use log::{debug, error, info, warn};

use crate::graph::{
	ElementDetail, Gender, GraphConfig, GraphData, GraphEngine, GraphError, LayoutName,
	RelationshipFilter, Surface, Theme, compute_centrality,
};

/// Filename of the PNG export.
pub const PNG_FILENAME: &str = "graph.png";
/// Filename of the JSON export.
pub const JSON_FILENAME: &str = "graph.json";

/// Fields of the add-node form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewNodeForm {
	/// Pending id.
	pub id: String,
	/// Pending gender.
	pub gender: Gender,
}

/// Fields of the shortest-path form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathQuery {
	/// Start node id.
	pub source: String,
	/// End node id.
	pub target: String,
}

/// Everything the panels render. Never holds topology.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
	/// Whether an engine is mounted.
	pub ready: bool,
	/// Snapshot of the selected node or edge.
	pub selection: Option<ElementDetail>,
	/// Text of the highlight box.
	pub highlight: String,
	/// Relationship filter.
	pub filter: RelationshipFilter,
	/// Add-node form.
	pub new_node: NewNodeForm,
	/// Shortest-path form.
	pub path_query: PathQuery,
	/// Element ids of the last shortest path.
	pub path: Vec<String>,
	/// Layout choice.
	pub layout: LayoutName,
	/// Light or dark mode.
	pub theme: Theme,
}

/// A user intent.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// The graph view mounted with a surface of this size.
	Mount {
		/// Initial people and relationships.
		data: GraphData,
		/// Canvas size.
		surface: Surface,
	},
	/// The graph view is going away.
	Unmount,
	/// An element was tapped.
	Select(String),
	/// Drop the current selection.
	ClearSelection,
	/// Highlight box changed.
	SetHighlight(String),
	/// Filter menu changed.
	SetFilter(RelationshipFilter),
	/// Layout menu changed.
	SetLayout(String),
	/// Add-node id field changed.
	SetNewNodeId(String),
	/// Add-node gender changed.
	SetNewNodeGender(Gender),
	/// Add the pending node.
	AddNode,
	/// Context menu "delete".
	RemoveNode(String),
	/// Context menu "edit".
	EditNode(String),
	/// Path start field changed.
	SetPathSource(String),
	/// Path end field changed.
	SetPathTarget(String),
	/// Run the pending path query.
	FindPath,
	/// Download the graph as PNG.
	ExportPng,
	/// Download the graph as JSON.
	ExportJson,
	/// Show betweenness centrality.
	ComputeCentrality,
	/// Switch light/dark.
	ToggleTheme,
}

/// Work the browser layer performs after a command.
#[derive(Clone, Debug, PartialEq)]
pub enum SideEffect {
	/// Save bytes under a filename.
	Download {
		/// Suggested filename.
		filename: &'static str,
		/// MIME type.
		mime: &'static str,
		/// File contents.
		bytes: Vec<u8>,
	},
	/// Blocking informational message.
	Notice(String),
	/// A non-fatal failure the user should see.
	Failure(String),
}

/// Owns the engine (when mounted) and the view state.
#[derive(Debug, Default)]
pub struct ViewController {
	engine: Option<GraphEngine>,
	state: ViewState,
	config: GraphConfig,
}

impl ViewController {
	/// A controller whose engines use `config`.
	pub fn new(config: GraphConfig) -> Self {
		Self {
			engine: None,
			state: ViewState::default(),
			config,
		}
	}

	/// Current view state.
	pub fn state(&self) -> &ViewState {
		&self.state
	}

	/// The mounted engine.
	pub fn engine(&self) -> Option<&GraphEngine> {
		self.engine.as_ref()
	}

	/// The mounted engine, for viewport gestures and animation ticks.
	pub fn engine_mut(&mut self) -> Option<&mut GraphEngine> {
		self.engine.as_mut()
	}

	/// Processes one command to completion.
	pub fn dispatch(&mut self, command: Command) -> Option<SideEffect> {
		match command {
			Command::Mount { data, surface } => return self.mount(data, surface),
			Command::Unmount => {
				if self.engine.take().is_some() {
					info!("graph engine released");
				}
				self.state.ready = false;
			}
			Command::Select(id) => {
				if let Some(detail) = self.with_engine("select", |e| e.query_element(&id)) {
					if detail.is_none() {
						debug!("{}", GraphError::NotFound(id));
					}
					self.state.selection = detail;
				}
			}
			Command::ClearSelection => self.state.selection = None,
			Command::SetHighlight(text) => {
				self.with_engine("highlight", |e| e.set_highlight(&text));
				self.state.highlight = text;
			}
			Command::SetFilter(filter) => {
				let applied = filter.clone();
				self.with_engine("filter", |e| e.set_relationship_filter(applied));
				self.state.filter = filter;
			}
			Command::SetLayout(name) => {
				match name.parse::<LayoutName>() {
					Ok(layout) => self.state.layout = layout,
					Err(err) => warn!("{err}"),
				}
				self.with_engine("layout", |e| e.run_layout(&name));
			}
			Command::SetNewNodeId(id) => self.state.new_node.id = id,
			Command::SetNewNodeGender(gender) => self.state.new_node.gender = gender,
			Command::AddNode => self.add_node(),
			Command::RemoveNode(id) => self.remove_node(&id),
			Command::EditNode(id) => return Some(SideEffect::Notice(format!("编辑节点: {id}"))),
			Command::SetPathSource(id) => self.state.path_query.source = id,
			Command::SetPathTarget(id) => self.state.path_query.target = id,
			Command::FindPath => self.find_path(),
			Command::ExportPng => {
				return self
					.with_engine("export png", |e| e.export_raster())
					.map(|result| match result {
						Ok(bytes) => SideEffect::Download {
							filename: PNG_FILENAME,
							mime: "image/png",
							bytes,
						},
						Err(err) => {
							error!("{err}");
							SideEffect::Failure(err.to_string())
						}
					});
			}
			Command::ExportJson => {
				return self
					.with_engine("export json", |e| e.export_document().to_json())
					.map(|result| match result {
						Ok(json) => SideEffect::Download {
							filename: JSON_FILENAME,
							mime: "application/json",
							bytes: json.into_bytes(),
						},
						Err(err) => {
							error!("{err}");
							SideEffect::Failure(err.to_string())
						}
					});
			}
			Command::ComputeCentrality => {
				let scores = self.with_engine("centrality", |e| compute_centrality(e))?;
				return match serde_json::to_string_pretty(&scores) {
					Ok(json) => Some(SideEffect::Notice(format!("Betweenness Centrality: {json}"))),
					Err(err) => {
						error!("cannot format centrality: {err}");
						None
					}
				};
			}
			Command::ToggleTheme => self.state.theme = self.state.theme.toggled(),
		}
		None
	}

	fn mount(&mut self, data: GraphData, surface: Surface) -> Option<SideEffect> {
		self.engine = None;
		self.state.ready = false;
		match GraphEngine::initialize(data, surface, self.config.clone()) {
			Ok(mut engine) => {
				// Bring the fresh engine in line with preferences chosen earlier.
				engine.set_relationship_filter(self.state.filter.clone());
				engine.set_highlight(&self.state.highlight);
				if self.state.layout != engine.layout() {
					engine.run_layout(self.state.layout.as_str());
				}
				self.state.selection = None;
				self.state.path.clear();
				self.engine = Some(engine);
				self.state.ready = true;
				None
			}
			Err(err) => {
				error!("{err}");
				Some(SideEffect::Failure(err.to_string()))
			}
		}
	}

	fn add_node(&mut self) {
		if self.state.new_node.id.is_empty() {
			debug!("{}", GraphError::Validation { field: "new node id" });
			return;
		}
		let NewNodeForm { id, gender } = self.state.new_node.clone();
		let added = self.with_engine("add node", |e| e.add_node(&id, gender));
		if added == Some(true) {
			self.state.new_node.id.clear();
		}
	}

	fn remove_node(&mut self, id: &str) {
		if self.with_engine("remove node", |e| e.remove_node(id)) != Some(true) {
			return;
		}
		if self.state.selection.as_ref().is_some_and(|s| s.involves(id)) {
			self.state.selection = None;
		}
		if self.state.path.iter().any(|p| p == id) {
			self.state.path.clear();
			self.with_engine("clear path", |e| e.clear_path_marks());
		}
	}

	fn find_path(&mut self) {
		let PathQuery { source, target } = self.state.path_query.clone();
		if source.is_empty() || target.is_empty() {
			let field = if source.is_empty() { "path source" } else { "path target" };
			debug!("{}", GraphError::Validation { field });
			return;
		}
		if let Some(path) = self.with_engine("find path", |e| e.find_shortest_path(&source, &target)) {
			self.state.path = path;
		}
	}

	/// Runs `op` against the engine, or logs and skips it while uninitialized.
	fn with_engine<T>(&mut self, what: &str, op: impl FnOnce(&mut GraphEngine) -> T) -> Option<T> {
		match self.engine.as_mut() {
			Some(engine) => Some(op(engine)),
			None => {
				debug!("{what} ignored: {}", GraphError::Uninitialized);
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeRecord, NodeRecord};

	fn data() -> GraphData {
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

	fn mounted() -> ViewController {
		let mut controller = ViewController::default();
		let effect = controller.dispatch(Command::Mount {
			data: data(),
			surface: Surface::new(800.0, 600.0),
		});
		assert_eq!(effect, None);
		controller
	}

	#[test]
	fn commands_before_mount_are_no_ops() {
		let mut controller = ViewController::default();
		assert_eq!(controller.dispatch(Command::ExportPng), None);
		assert_eq!(controller.dispatch(Command::ComputeCentrality), None);
		controller.dispatch(Command::Select("A".into()));
		assert!(controller.state().selection.is_none());
		controller.dispatch(Command::SetHighlight("A".into()));
		assert_eq!(controller.state().highlight, "A");
		assert!(!controller.state().ready);
	}

	#[test]
	fn failed_mount_reports_and_stays_uninitialized() {
		let mut controller = ViewController::default();
		let effect = controller.dispatch(Command::Mount {
			data: data(),
			surface: Surface::new(0.0, 0.0),
		});
		assert!(matches!(effect, Some(SideEffect::Failure(_))));
		assert!(controller.engine().is_none());
		assert!(!controller.state().ready);
	}

	#[test]
	fn mount_applies_earlier_preferences() {
		let mut controller = ViewController::default();
		controller.dispatch(Command::SetFilter(RelationshipFilter::parse("EX_PARTNER")));
		controller.dispatch(Command::SetLayout("grid".into()));
		controller.dispatch(Command::Mount {
			data: data(),
			surface: Surface::new(800.0, 600.0),
		});
		let engine = controller.engine().unwrap();
		assert_eq!(engine.layout(), LayoutName::Grid);
		assert_eq!(engine.filter().as_str(), "EX_PARTNER");
	}

	#[test]
	fn selecting_replaces_previous_selection() {
		let mut controller = mounted();
		controller.dispatch(Command::Select("A".into()));
		assert!(matches!(controller.state().selection, Some(ElementDetail::Node(_))));
		controller.dispatch(Command::Select("B-C".into()));
		assert!(matches!(controller.state().selection, Some(ElementDetail::Edge(_))));
		controller.dispatch(Command::ClearSelection);
		assert!(controller.state().selection.is_none());
	}

	#[test]
	fn add_node_validates_and_clears_form() {
		let mut controller = mounted();
		controller.dispatch(Command::AddNode);
		assert_eq!(controller.engine().unwrap().node_count(), 3);

		controller.dispatch(Command::SetNewNodeId("D".into()));
		controller.dispatch(Command::SetNewNodeGender(Gender::Female));
		controller.dispatch(Command::AddNode);
		assert_eq!(controller.engine().unwrap().node_count(), 4);
		assert!(controller.state().new_node.id.is_empty());
		assert_eq!(controller.state().new_node.gender, Gender::Female);
	}

	#[test]
	fn find_path_requires_both_endpoints() {
		let mut controller = mounted();
		controller.dispatch(Command::SetPathSource("A".into()));
		controller.dispatch(Command::FindPath);
		assert!(controller.state().path.is_empty());

		controller.dispatch(Command::SetPathTarget("C".into()));
		controller.dispatch(Command::FindPath);
		assert_eq!(controller.state().path, ["A", "A-B", "B", "B-C", "C"]);
	}

	#[test]
	fn removing_a_node_drops_stale_selection_and_path() {
		let mut controller = mounted();
		controller.dispatch(Command::SetPathSource("A".into()));
		controller.dispatch(Command::SetPathTarget("C".into()));
		controller.dispatch(Command::FindPath);
		controller.dispatch(Command::Select("A".into()));

		controller.dispatch(Command::RemoveNode("B".into()));
		assert!(controller.state().selection.is_none());
		assert!(controller.state().path.is_empty());
		assert_eq!(controller.engine().unwrap().edge_count(), 0);
	}

	#[test]
	fn removing_a_path_node_clears_engine_marks() {
		let mut controller = mounted();
		controller.dispatch(Command::SetPathSource("A".into()));
		controller.dispatch(Command::SetPathTarget("C".into()));
		controller.dispatch(Command::FindPath);
		controller.dispatch(Command::RemoveNode("B".into()));

		assert!(controller.state().path.is_empty());
		let engine = controller.engine().unwrap();
		let marked: Vec<&str> = engine
			.nodes()
			.filter(|n| n.style.on_path)
			.map(|n| n.record.id.as_str())
			.collect();
		assert!(marked.is_empty(), "still marked: {marked:?}");
	}

	#[test]
	fn removing_an_off_path_node_keeps_marks() {
		let mut controller = mounted();
		controller.dispatch(Command::SetNewNodeId("D".into()));
		controller.dispatch(Command::AddNode);
		controller.dispatch(Command::SetPathSource("A".into()));
		controller.dispatch(Command::SetPathTarget("B".into()));
		controller.dispatch(Command::FindPath);
		controller.dispatch(Command::RemoveNode("D".into()));

		assert_eq!(controller.state().path, ["A", "A-B", "B"]);
		let engine = controller.engine().unwrap();
		assert_eq!(engine.nodes().filter(|n| n.style.on_path).count(), 2);
	}

	#[test]
	fn unknown_layout_keeps_current_choice() {
		let mut controller = mounted();
		controller.dispatch(Command::SetLayout("circle".into()));
		controller.dispatch(Command::SetLayout("spiral".into()));
		assert_eq!(controller.state().layout, LayoutName::Circle);
		assert_eq!(controller.engine().unwrap().layout(), LayoutName::Circle);
	}

	#[test]
	fn exports_use_fixed_filenames() {
		let mut controller = mounted();
		let Some(SideEffect::Download { filename, mime, bytes }) = controller.dispatch(Command::ExportPng)
		else {
			panic!("expected a PNG download");
		};
		assert_eq!((filename, mime), ("graph.png", "image/png"));
		assert!(!bytes.is_empty());

		let Some(SideEffect::Download { filename, bytes, .. }) = controller.dispatch(Command::ExportJson)
		else {
			panic!("expected a JSON download");
		};
		assert_eq!(filename, "graph.json");
		assert!(String::from_utf8(bytes).unwrap().contains("\"elements\""));
	}

	#[test]
	fn centrality_is_reported_as_notice() {
		let mut controller = mounted();
		let Some(SideEffect::Notice(text)) = controller.dispatch(Command::ComputeCentrality) else {
			panic!("expected a notice");
		};
		assert!(text.starts_with("Betweenness Centrality:"));
		assert!(text.contains("\"B\""));
	}

	#[test]
	fn unmount_releases_engine() {
		let mut controller = mounted();
		controller.dispatch(Command::Unmount);
		assert!(controller.engine().is_none());
		assert!(!controller.state().ready);
		assert_eq!(controller.dispatch(Command::ExportJson), None);
	}

	#[test]
	fn theme_toggles() {
		let mut controller = ViewController::default();
		controller.dispatch(Command::ToggleTheme);
		assert_eq!(controller.state().theme, Theme::Dark);
		controller.dispatch(Command::ToggleTheme);
		assert_eq!(controller.state().theme, Theme::Light);
	}
}
