use leptos::prelude::*;

use crate::browser;
use crate::controller::{Command, ViewController, ViewState};
use crate::graph::{GraphConfig, GraphEngine};

/// Shared handle to the controller, provided as context by the home page.
///
/// The controller itself is not reactive; every dispatch publishes a fresh
/// [`ViewState`] snapshot for the panels to read.
#[derive(Clone, Copy)]
pub struct Session {
	controller: StoredValue<ViewController, LocalStorage>,
	/// Latest view state.
	pub state: RwSignal<ViewState>,
}

impl Session {
	pub fn new(config: GraphConfig) -> Self {
		let controller = ViewController::new(config);
		let state = RwSignal::new(controller.state().clone());
		Self {
			controller: StoredValue::new_local(controller),
			state,
		}
	}

	/// Runs a command, publishes the new state and performs any side effect.
	pub fn dispatch(&self, command: Command) {
		let Some((effect, state)) = self.controller.try_update_value(|c| {
			let effect = c.dispatch(command);
			(effect, c.state().clone())
		}) else {
			return;
		};
		self.state.set(state);
		if let Some(effect) = effect {
			browser::perform(effect);
		}
	}

	/// Reads the mounted engine, if any.
	pub fn with_engine<T>(&self, f: impl FnOnce(&GraphEngine) -> T) -> Option<T> {
		self.controller
			.try_with_value(|c| c.engine().map(f))
			.flatten()
	}

	/// Drives the mounted engine directly, for gestures and animation frames.
	pub fn with_engine_mut<T>(&self, f: impl FnOnce(&mut GraphEngine) -> T) -> Option<T> {
		self.controller
			.try_update_value(|c| c.engine_mut().map(f))
			.flatten()
	}
}

/// The session provided by an ancestor.
pub fn use_session() -> Session {
	expect_context::<Session>()
}
