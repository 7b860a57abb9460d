use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::{ContextMenu, PointerState};
use crate::components::session::use_session;
use crate::controller::Command;
use crate::graph::{GraphData, Surface};

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);
const MAX_FRAME: f64 = 0.1;

/// Canvas view of the graph. Mounts the engine on first render and releases
/// it on cleanup.
#[component]
pub fn GraphView(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let session = use_session();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let pointer: Rc<RefCell<PointerState>> = Rc::new(RefCell::new(PointerState::default()));
	let menu = RwSignal::new(None::<ContextMenu>);

	let alive = StoredValue::new(true);
	let frame_id = StoredValue::new(None::<i32>);
	let resize_cb = StoredValue::new_local(None::<Closure<dyn FnMut()>>);
	let frame_cb = StoredValue::new_local(None::<Closure<dyn FnMut(f64)>>);
	let pointer_anim = pointer.clone();

	let schedule_frame = move || {
		frame_cb.try_with_value(|cb| {
			if let (Some(cb), Some(window)) = (cb, web_sys::window()) {
				let next = window.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
				frame_id.try_update_value(|id| *id = next);
			}
		});
	};

	let measure = move |canvas: &HtmlCanvasElement| -> (f64, f64) {
		let parent = canvas.parent_element();
		(
			width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.filter(|w| *w > 0.0)
					.unwrap_or(FALLBACK_SIZE.0)
			}),
			height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.filter(|h| *h > 0.0)
					.unwrap_or(FALLBACK_SIZE.1)
			}),
		)
	};

	Effect::new(move |mounted: Option<bool>| {
		if mounted == Some(true) {
			return true;
		}
		let Some(canvas) = canvas_ref.get() else {
			return false;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("graph view mounted without a window");
			return true;
		};

		let (w, h) = measure(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return true;
				}
			},
			_ => {
				error!("canvas has no 2d context");
				return true;
			}
		};

		session.dispatch(Command::Mount {
			data: data.get_untracked(),
			surface: Surface::new(w, h),
		});

		let canvas_resize = canvas.clone();
		resize_cb.set_value(Some(Closure::new(move || {
			let (nw, nh) = measure(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			session.with_engine_mut(|engine| engine.resize(nw, nh));
		})));
		resize_cb.with_value(|cb| {
			if let Some(cb) = cb {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});

		let pointer_frame = pointer_anim.clone();
		let mut last: Option<f64> = None;
		frame_cb.set_value(Some(Closure::new(move |now: f64| {
			if !alive.try_get_value().unwrap_or(false) {
				return;
			}
			let dt = last.map_or(0.0, |l| ((now - l) / 1000.0).clamp(0.0, MAX_FRAME));
			last = Some(now);
			let theme = session.state.with_untracked(|s| s.theme);
			let hover = pointer_frame.borrow().hover.clone();
			session.with_engine_mut(|engine| {
				engine.tick(dt);
				render::render(engine, theme, hover.as_ref(), &ctx);
			});
			schedule_frame();
		})));
		schedule_frame();
		true
	});

	on_cleanup(move || {
		alive.set_value(false);
		if let Some(window) = web_sys::window() {
			if let Some(Some(id)) = frame_id.try_get_value() {
				let _ = window.cancel_animation_frame(id);
			}
			frame_cb.try_update_value(Option::take);
			resize_cb.try_update_value(|cb| {
				if let Some(cb) = cb.take() {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			});
		}
		session.dispatch(Command::Unmount);
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let pointer_md = pointer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		menu.set(None);
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let mut pointer = pointer_md.borrow_mut();
		session.with_engine(|engine| pointer.press(engine, x, y));
	};

	let pointer_mm = pointer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let mut pointer = pointer_mm.borrow_mut();
		session.with_engine_mut(|engine| pointer.motion(engine, x, y));
	};

	let pointer_mu = pointer.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let tapped = {
			let mut pointer = pointer_mu.borrow_mut();
			session.with_engine(|engine| pointer.release(engine, x, y)).flatten()
		};
		if let Some(id) = tapped {
			session.dispatch(Command::Select(id));
		}
	};

	let pointer_ml = pointer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		pointer_ml.borrow_mut().leave();
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = local_point(mouse) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		session.with_engine_mut(|engine| engine.zoom_at(x, y, factor));
	};

	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let node = session
			.with_engine(|engine| {
				engine
					.node_at(x, y)
					.and_then(|n| engine.node_record(n))
					.map(|r| r.id.clone())
			})
			.flatten();
		match node {
			Some(node) => menu.set(Some(ContextMenu { node, x, y })),
			None => {
				debug!("context menu ignored away from nodes");
				menu.set(None);
			}
		}
	};

	let run_menu_item = move |make: fn(String) -> Command| {
		if let Some(open) = menu.get_untracked() {
			menu.set(None);
			session.dispatch(make(open.node));
		}
	};

	view! {
		<div class="graph-view">
			<canvas
				node_ref=canvas_ref
				class="graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:contextmenu=on_contextmenu
				style="display: block; cursor: grab;"
			/>
			{move || {
				menu.get()
					.map(|open| {
						view! {
							<ul
								class="context-menu"
								style=format!("left: {}px; top: {}px;", open.x, open.y)
							>
								<li on:click=move |_| run_menu_item(Command::RemoveNode)>"删除节点"</li>
								<li on:click=move |_| run_menu_item(Command::EditNode)>"编辑节点"</li>
							</ul>
						}
					})
			}}
		</div>
	}
}
