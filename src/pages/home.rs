use leptos::prelude::*;

use crate::components::control_panel::ControlPanel;
use crate::components::detail_panel::DetailPanel;
use crate::components::graph_view::GraphView;
use crate::components::session::Session;
use crate::controller::Command;
use crate::graph::{GraphConfig, GraphData};

/// People and relationships shown on first load.
const PEOPLE: &str = include_str!("../../data/people.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let session = Session::new(GraphConfig::default());
	provide_context(session);
	let theme = move || session.state.with(|s| s.theme.as_str());

	let graph = GraphData::from_json(PEOPLE).map(|data| {
		let data = Signal::stored(data);
		view! { <GraphView data=data /> }
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="app" data-theme=theme>
				<header class="app-bar">
					<h1>"关系图可视化"</h1>
					<button on:click=move |_| session.dispatch(Command::ToggleTheme)>
						{move || if theme() == "dark" { "浅色模式" } else { "深色模式" }}
					</button>
				</header>
				<main class="workspace">
					<ControlPanel />
					<div class="graph-container">{graph}</div>
					<DetailPanel />
				</main>
			</div>
		</ErrorBoundary>
	}
}
