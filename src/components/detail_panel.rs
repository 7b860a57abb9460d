use leptos::prelude::*;

use super::session::use_session;
use crate::controller::Command;
use crate::graph::{EdgeRecord, ElementDetail, NodeDetail};

/// The selected element and the last shortest path.
#[component]
pub fn DetailPanel() -> impl IntoView {
	let session = use_session();
	let state = session.state;

	view! {
		<aside class="detail-panel">
			{move || {
				state
					.with(|s| s.selection.clone())
					.map(|selection| {
						let body = match selection {
							ElementDetail::Node(detail) => node_detail(detail).into_any(),
							ElementDetail::Edge(edge) => edge_detail(edge).into_any(),
						};
						view! {
							<section class="selection">
								<button
									class="close"
									on:click=move |_| session.dispatch(Command::ClearSelection)
								>
									"×"
								</button>
								{body}
							</section>
						}
					})
			}}
			<Show when=move || state.with(|s| !s.path.is_empty())>
				<section class="path">
					<h2>"最短路径"</h2>
					<p>{move || state.with(|s| s.path.join(" → "))}</p>
				</section>
			</Show>
		</aside>
	}
}

fn node_detail(detail: NodeDetail) -> impl IntoView {
	let session = use_session();
	let NodeDetail {
		node,
		connected_nodes,
		connected_edges,
	} = detail;

	view! {
		<h2>"节点详情"</h2>
		<dl>
			<dt>"ID"</dt>
			<dd>{node.id}</dd>
			<dt>"性别"</dt>
			<dd>{node.gender.as_str()}</dd>
		</dl>
		<h3>{format!("相关节点 ({})", connected_nodes.len())}</h3>
		<ul>
			{connected_nodes
				.into_iter()
				.map(|n| {
					let id = n.id.clone();
					view! {
						<li>
							<a on:click=move |_| session.dispatch(Command::Select(id.clone()))>
								{n.id}
							</a>
							{format!(" ({})", n.gender)}
						</li>
					}
				})
				.collect_view()}
		</ul>
		<h3>{format!("相关关系 ({})", connected_edges.len())}</h3>
		<ul>
			{connected_edges
				.into_iter()
				.map(|e| view! { <li>{format!("{}: {}", e.id, e.relationship)}</li> })
				.collect_view()}
		</ul>
	}
}

fn edge_detail(edge: EdgeRecord) -> impl IntoView {
	view! {
		<h2>"关系详情"</h2>
		<dl>
			<dt>"ID"</dt>
			<dd>{edge.id}</dd>
			<dt>"起点"</dt>
			<dd>{edge.source}</dd>
			<dt>"终点"</dt>
			<dd>{edge.target}</dd>
			<dt>"关系"</dt>
			<dd>{edge.relationship.to_string()}</dd>
		</dl>
	}
}
