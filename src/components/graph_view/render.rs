use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::Hover;
use crate::graph::style::{self, HIGHLIGHT};
use crate::graph::{GraphEngine, Theme};

const PATH_RING: f64 = 2.0;
const DASH: f64 = 6.0;
const GAP: f64 = 3.0;
const TOOLTIP_FONT: f64 = 12.0;

pub fn render(
	engine: &GraphEngine,
	theme: Theme,
	hover: Option<&Hover>,
	ctx: &CanvasRenderingContext2d,
) {
	let surface = engine.surface();
	let transform = engine.viewport().transform();
	ctx.set_fill_style_str(&theme.background().css());
	ctx.fill_rect(0.0, 0.0, surface.width, surface.height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(engine, ctx);
	draw_nodes(engine, theme, ctx);
	ctx.restore();
	if let Some(hover) = hover {
		draw_tooltip(hover, theme, ctx);
	}
}

fn draw_edges(engine: &GraphEngine, ctx: &CanvasRenderingContext2d) {
	let width = engine.config().edge_width;
	let empty = js_sys::Array::new();
	let dashed = js_sys::Array::of2(&JsValue::from_f64(DASH), &JsValue::from_f64(GAP));

	for edge in engine.edges() {
		let kind = &edge.record.relationship;
		ctx.set_global_alpha(edge.style.opacity);
		ctx.set_stroke_style_str(&edge.style.stroke(kind).css());
		ctx.set_line_width(if edge.style.on_path { width * 2.0 } else { width });
		let _ = ctx.set_line_dash(if style::is_dashed(kind) { &dashed } else { &empty });
		ctx.begin_path();
		ctx.move_to(edge.from.x, edge.from.y);
		ctx.line_to(edge.to.x, edge.to.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&empty);
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(engine: &GraphEngine, theme: Theme, ctx: &CanvasRenderingContext2d) {
	let radius = engine.config().node_radius;
	let k = engine.viewport().transform().k;
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	ctx.set_text_align("center");

	for node in engine.nodes() {
		let (x, y) = (node.position.x, node.position.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style::gender_fill(node.record.gender).css());
		ctx.fill();

		let ring = if node.style.border_width > 0.0 {
			node.style.border_width
		} else if node.style.on_path {
			PATH_RING
		} else {
			0.0
		};
		if ring > 0.0 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + ring / 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&HIGHLIGHT.css());
			ctx.set_line_width(ring);
			ctx.stroke();
		}

		ctx.set_fill_style_str(&theme.foreground().css());
		let _ = ctx.fill_text(&node.record.id, x, y + radius + 12.0 / k.max(0.5));
	}
	ctx.set_text_align("start");
}

fn draw_tooltip(hover: &Hover, theme: Theme, ctx: &CanvasRenderingContext2d) {
	let lines = [
		format!("姓名: {}", hover.id),
		format!("性别: {}", hover.gender),
	];
	let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
	let (w, h) = (widest * TOOLTIP_FONT + 12.0, 2.0 * (TOOLTIP_FONT + 4.0) + 8.0);
	let (x, y) = (hover.x + 12.0, hover.y + 12.0);

	ctx.set_fill_style_str(&theme.foreground().rgba(0.85));
	ctx.fill_rect(x, y, w, h);
	ctx.set_fill_style_str(&theme.background().css());
	ctx.set_font(&format!("{TOOLTIP_FONT}px sans-serif"));
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + 6.0, y + 4.0 + (i as f64 + 1.0) * (TOOLTIP_FONT + 4.0));
	}
}
