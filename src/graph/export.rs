//! PNG and JSON export.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use serde::{Deserialize, Serialize};

use super::config::GraphConfig;
use super::engine::{EdgeView, NodeView};
use super::error::GraphError;
use super::layout::LayoutName;
use super::style::{self, Color};
use super::types::{EdgeRecord, GraphData, NodeRecord, Point};
use super::viewport::Bounds;

const PNG_BACKGROUND: Color = style::WHITE;
const DASH: f64 = 6.0;
const GAP: f64 = 3.0;
const PATH_RING: f64 = 2.0;

/// A person plus the position the engine gave it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
	/// Data as in the source format.
	pub data: NodeRecord,
	/// Graph-space position; absent in hand-written documents.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Point>,
}

/// A relationship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeElement {
	/// Data as in the source format, id included.
	pub data: EdgeRecord,
}

/// The element collections of a [`GraphDocument`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentElements {
	/// People.
	#[serde(default)]
	pub nodes: Vec<NodeElement>,
	/// Relationships.
	#[serde(default)]
	pub edges: Vec<EdgeElement>,
}

/// Re-loadable snapshot of the graph, shaped like a Cytoscape JSON export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
	/// Nodes and edges.
	pub elements: DocumentElements,
	/// Zoom at export time.
	#[serde(default = "unit_zoom")]
	pub zoom: f64,
	/// Pan offset at export time.
	#[serde(default)]
	pub pan: Point,
	/// Layout name at export time.
	#[serde(default)]
	pub layout: String,
}

fn unit_zoom() -> f64 {
	1.0
}

impl GraphDocument {
	pub(crate) fn new(
		nodes: impl IntoIterator<Item = (NodeRecord, Point)>,
		edges: impl IntoIterator<Item = EdgeRecord>,
		zoom: f64,
		pan: Point,
		layout: LayoutName,
	) -> Self {
		Self {
			elements: DocumentElements {
				nodes: nodes
					.into_iter()
					.map(|(data, position)| NodeElement {
						data,
						position: Some(position),
					})
					.collect(),
				edges: edges.into_iter().map(|data| EdgeElement { data }).collect(),
			},
			zoom,
			pan,
			layout: layout.as_str().to_string(),
		}
	}

	/// Pretty-printed JSON, as written to `graph.json`.
	pub fn to_json(&self) -> Result<String, GraphError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Parses a previously exported document.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}
}

impl From<GraphDocument> for GraphData {
	fn from(document: GraphDocument) -> Self {
		GraphData {
			nodes: document.elements.nodes.into_iter().map(|n| n.data).collect(),
			edges: document.elements.edges.into_iter().map(|e| e.data).collect(),
		}
	}
}

pub(crate) struct RasterScene<'a> {
	pub nodes: Vec<NodeView<'a>>,
	pub edges: Vec<EdgeView<'a>>,
}

/// Draws the full graph framing at `export_scale` and encodes it as PNG.
pub(crate) fn rasterize(scene: &RasterScene<'_>, config: &GraphConfig) -> Result<Vec<u8>, GraphError> {
	let scale = config.export_scale;
	if !(scale.is_finite() && scale > 0.0) {
		return Err(GraphError::Export(format!("invalid export scale {scale}")));
	}
	let margin = config.node_radius + config.highlight_border_width + config.export_padding;
	let (origin, w, h) = match Bounds::around(scene.nodes.iter().map(|n| n.position), margin) {
		Some(b) => (b.min, b.width(), b.height()),
		None => (Point::default(), 2.0 * config.export_padding, 2.0 * config.export_padding),
	};
	let (width, height) = ((w * scale).ceil(), (h * scale).ceil());
	let max = config.max_export_dimension as f64;
	if !(width >= 1.0 && height >= 1.0 && width <= max && height <= max) {
		return Err(GraphError::Export(format!(
			"image of {width}x{height} pixels is outside 1..={max}"
		)));
	}
	let (width, height) = (width as u32, height as u32);
	let area = u64::from(width) * u64::from(height);
	if area > config.max_export_pixels {
		return Err(GraphError::Export(format!(
			"image of {width}x{height} pixels exceeds {} pixels",
			config.max_export_pixels
		)));
	}

	let mut img = RgbaImage::from_pixel(width, height, pixel(PNG_BACKGROUND));
	let to_px = |p: Point| ((p.x - origin.x) * scale, (p.y - origin.y) * scale);

	for edge in &scene.edges {
		let color = edge
			.style
			.stroke(&edge.record.relationship)
			.over(PNG_BACKGROUND, edge.style.opacity);
		let stroke = Stroke {
			width: config.edge_width * scale,
			dash: style::is_dashed(&edge.record.relationship).then_some((DASH * scale, GAP * scale)),
			color: pixel(color),
		};
		stroke.draw(&mut img, to_px(edge.from), to_px(edge.to));
	}

	for node in &scene.nodes {
		let (cx, cy) = to_px(node.position);
		let center = (cx.round() as i32, cy.round() as i32);
		let radius = (config.node_radius * scale).round() as i32;
		draw_filled_circle_mut(&mut img, center, radius, pixel(style::gender_fill(node.record.gender)));

		let ring = if node.style.border_width > 0.0 {
			node.style.border_width
		} else if node.style.on_path {
			PATH_RING
		} else {
			0.0
		};
		let ring_px = (ring * scale).round() as i32;
		for r in radius..radius + ring_px {
			draw_hollow_circle_mut(&mut img, center, r, pixel(style::HIGHLIGHT));
		}
	}

	let mut png = Vec::new();
	PngEncoder::new(&mut png)
		.write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
		.map_err(|e| GraphError::Export(e.to_string()))?;
	Ok(png)
}

fn pixel(color: Color) -> Rgba<u8> {
	Rgba([color.r, color.g, color.b, 255])
}

struct Stroke {
	width: f64,
	dash: Option<(f64, f64)>,
	color: Rgba<u8>,
}

impl Stroke {
	fn draw(&self, img: &mut RgbaImage, a: (f64, f64), b: (f64, f64)) {
		let (dx, dy) = (b.0 - a.0, b.1 - a.1);
		let len = dx.hypot(dy);
		if len < 0.5 {
			return;
		}
		let (ux, uy) = (dx / len, dy / len);
		let (nx, ny) = (-uy, ux);

		let pieces = match self.dash {
			Some((on, off)) if on > 0.0 => {
				let mut pieces = Vec::new();
				let mut start = 0.0;
				while start < len {
					pieces.push((start, (start + on).min(len)));
					start += on + off;
				}
				pieces
			}
			_ => vec![(0.0, len)],
		};

		let lanes = self.width.ceil().max(1.0) as i32;
		for (s, e) in pieces {
			for lane in 0..lanes {
				let offset = -self.width / 2.0 + (lane as f64 + 0.5) * self.width / lanes as f64;
				let start = (
					(a.0 + ux * s + nx * offset) as f32,
					(a.1 + uy * s + ny * offset) as f32,
				);
				let end = (
					(a.0 + ux * e + nx * offset) as f32,
					(a.1 + uy * e + ny * offset) as f32,
				);
				draw_line_segment_mut(img, start, end, self.color);
			}
		}
	}
}
