use crate::graph::{Gender, GraphEngine, NodeId, Point};

/// Pointer travel, in pixels, below which a press-release counts as a tap.
pub const TAP_SLOP: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
	pub node: NodeId,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
	pub moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanState {
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
	pub moved: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Drag(DragState),
	Pan(PanState),
}

/// Person under the pointer, with the screen position for the tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct Hover {
	pub id: String,
	pub gender: Gender,
	pub x: f64,
	pub y: f64,
}

/// An open node context menu.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextMenu {
	pub node: String,
	pub x: f64,
	pub y: f64,
}

/// Pointer interaction with the canvas.
#[derive(Clone, Debug, Default)]
pub struct PointerState {
	pub gesture: Gesture,
	pub hover: Option<Hover>,
}

impl PointerState {
	/// Starts dragging the node under the pointer, or panning otherwise.
	pub fn press(&mut self, engine: &GraphEngine, x: f64, y: f64) {
		self.gesture = match engine
			.node_at(x, y)
			.and_then(|node| Some((node, engine.node_position(node)?)))
		{
			Some((node, node_start)) => Gesture::Drag(DragState {
				node,
				start_x: x,
				start_y: y,
				node_start,
				moved: false,
			}),
			None => Gesture::Pan(PanState {
				start_x: x,
				start_y: y,
				last_x: x,
				last_y: y,
				moved: false,
			}),
		};
	}

	pub fn motion(&mut self, engine: &mut GraphEngine, x: f64, y: f64) {
		match &mut self.gesture {
			Gesture::Idle => {
				self.hover = engine.node_at(x, y).and_then(|node| {
					let record = engine.node_record(node)?;
					Some(Hover {
						id: record.id.clone(),
						gender: record.gender,
						x,
						y,
					})
				});
			}
			Gesture::Drag(drag) => {
				drag.moved |= beyond_slop(drag.start_x, drag.start_y, x, y);
				if drag.moved {
					let k = engine.viewport().transform().k;
					let position = Point::new(
						drag.node_start.x + (x - drag.start_x) / k,
						drag.node_start.y + (y - drag.start_y) / k,
					);
					engine.move_node(drag.node, position);
				}
			}
			Gesture::Pan(pan) => {
				pan.moved |= beyond_slop(pan.start_x, pan.start_y, x, y);
				engine.pan_by(x - pan.last_x, y - pan.last_y);
				pan.last_x = x;
				pan.last_y = y;
			}
		}
	}

	/// Ends the gesture. A press that never moved is a tap, reported as the
	/// id of the element under the pointer.
	pub fn release(&mut self, engine: &GraphEngine, x: f64, y: f64) -> Option<String> {
		let moved = match std::mem::take(&mut self.gesture) {
			Gesture::Idle => return None,
			Gesture::Drag(drag) => drag.moved,
			Gesture::Pan(pan) => pan.moved,
		};
		if moved { None } else { engine.element_at(x, y) }
	}

	pub fn leave(&mut self) {
		self.gesture = Gesture::Idle;
		self.hover = None;
	}
}

fn beyond_slop(x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
	(x1 - x0).hypot(y1 - y0) > TAP_SLOP
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeRecord, GraphConfig, GraphData, NodeRecord, Surface};

	fn engine() -> GraphEngine {
		let data = GraphData {
			nodes: vec![
				NodeRecord::new("A", Gender::Male),
				NodeRecord::new("B", Gender::Female),
			],
			edges: vec![EdgeRecord::new("A", "B", "AFFECTION")],
		};
		GraphEngine::initialize(data, Surface::new(800.0, 600.0), GraphConfig::default()).unwrap()
	}

	fn screen_of(engine: &GraphEngine, id: &str) -> Point {
		let node = engine.node_id(id).unwrap();
		engine
			.viewport()
			.graph_to_screen(engine.node_position(node).unwrap())
	}

	#[test]
	fn tap_on_node_reports_its_id() {
		let mut engine = engine();
		let a = screen_of(&engine, "A");
		let mut pointer = PointerState::default();
		pointer.press(&engine, a.x, a.y);
		pointer.motion(&mut engine, a.x + 1.0, a.y);
		assert_eq!(pointer.release(&engine, a.x + 1.0, a.y).as_deref(), Some("A"));
		assert_eq!(pointer.gesture, Gesture::Idle);
	}

	#[test]
	fn dragging_moves_node_without_tapping() {
		let mut engine = engine();
		let a = screen_of(&engine, "A");
		let mut pointer = PointerState::default();
		pointer.press(&engine, a.x, a.y);
		pointer.motion(&mut engine, a.x + 40.0, a.y);
		assert_eq!(pointer.release(&engine, a.x + 40.0, a.y), None);
		let moved = screen_of(&engine, "A");
		assert!((moved.x - (a.x + 40.0)).abs() < 1e-6);
	}

	#[test]
	fn background_drag_pans() {
		let mut engine = engine();
		let before = engine.viewport().transform();
		let mut pointer = PointerState::default();
		pointer.press(&engine, -500.0, -500.0);
		pointer.motion(&mut engine, -480.0, -490.0);
		pointer.release(&engine, -480.0, -490.0);
		let after = engine.viewport().transform();
		assert!((after.x - before.x - 20.0).abs() < 1e-9);
		assert!((after.y - before.y - 10.0).abs() < 1e-9);
		assert_eq!(after.k, before.k);
	}

	#[test]
	fn hover_tracks_node_under_pointer() {
		let mut engine = engine();
		let b = screen_of(&engine, "B");
		let mut pointer = PointerState::default();
		pointer.motion(&mut engine, b.x, b.y);
		let hover = pointer.hover.clone().unwrap();
		assert_eq!((hover.id.as_str(), hover.gender), ("B", Gender::Female));
		pointer.leave();
		assert!(pointer.hover.is_none());
	}
}
