/// Force simulation tuning handed to `force_graph`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceParameters {
	/// Repulsion between every pair of nodes.
	pub charge: f32,
	/// Attraction along edges.
	pub spring: f32,
	/// Upper bound on any single force.
	pub max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Velocity retained per step.
	pub damping: f32,
}

impl Default for ForceParameters {
	fn default() -> Self {
		Self {
			charge: 150.0,
			spring: 0.05,
			max: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
		}
	}
}

/// Engine tuning. Everything has a sensible default.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Force-directed layout parameters.
	pub force: ForceParameters,
	/// Simulation steps run per force-directed layout.
	pub force_iterations: usize,
	/// Simulated seconds per step.
	pub force_step: f32,
	/// Seconds a layout transition takes.
	pub layout_duration: f64,
	/// Seconds a highlight fit animation takes.
	pub fit_duration: f64,
	/// Screen padding around a fitted element.
	pub fit_padding: f64,
	/// Zoom ceiling for fit animations.
	pub max_fit_zoom: f64,
	/// Opacity of edges hidden by the relationship filter.
	pub dimmed_opacity: f64,
	/// Node radius in graph units.
	pub node_radius: f64,
	/// Border width of a highlighted node.
	pub highlight_border_width: f64,
	/// Edge stroke width in graph units.
	pub edge_width: f64,
	/// Distance between cells of the grid, circle and tree layouts.
	pub spacing: f64,
	/// Screen distance within which a click picks an edge.
	pub edge_hit_tolerance: f64,
	/// Upscaling factor of the PNG export.
	pub export_scale: f64,
	/// Padding around the exported graph, in graph units.
	pub export_padding: f64,
	/// Largest PNG side the export will produce.
	pub max_export_dimension: u32,
	/// Largest pixel count (width times height) the export will allocate.
	pub max_export_pixels: u64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			force: ForceParameters::default(),
			force_iterations: 300,
			force_step: 0.016,
			layout_duration: 0.5,
			fit_duration: 0.5,
			fit_padding: 50.0,
			max_fit_zoom: 2.0,
			dimmed_opacity: 0.1,
			node_radius: 15.0,
			highlight_border_width: 4.0,
			edge_width: 2.0,
			spacing: 90.0,
			edge_hit_tolerance: 6.0,
			export_scale: 2.0,
			export_padding: 30.0,
			max_export_dimension: 16_384,
			max_export_pixels: 4096 * 4096,
		}
	}
}
