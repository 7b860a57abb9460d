use leptos::prelude::*;
use log::warn;

use super::session::use_session;
use crate::controller::Command;
use crate::graph::{Gender, LayoutName, RelationshipFilter, RelationshipKind};

fn relationship_label(kind: &RelationshipKind) -> &str {
	match kind {
		RelationshipKind::CurrentPartner => "现任伴侣",
		RelationshipKind::ExPartner => "前任伴侣",
		RelationshipKind::Affection => "暧昧",
		RelationshipKind::Other(other) => other,
	}
}

/// Inputs and buttons that turn into controller commands.
#[component]
pub fn ControlPanel() -> impl IntoView {
	let session = use_session();
	let state = session.state;

	view! {
		<aside class="control-panel">
			<section>
				<h2>"高亮节点"</h2>
				<input
					type="text"
					placeholder="节点 ID"
					prop:value=move || state.with(|s| s.highlight.clone())
					on:input=move |ev| session.dispatch(Command::SetHighlight(event_target_value(&ev)))
				/>
			</section>

			<section>
				<h2>"关系筛选"</h2>
				<select on:change=move |ev| {
					let filter = RelationshipFilter::parse(&event_target_value(&ev));
					session.dispatch(Command::SetFilter(filter));
				}>
					<option value="" prop:selected=move || state.with(|s| s.filter.as_str().is_empty())>
						"全部关系"
					</option>
					{RelationshipKind::KNOWN
						.iter()
						.map(|kind| {
							let value = kind.as_str().to_string();
							let current = value.clone();
							view! {
								<option
									value=value
									prop:selected=move || state.with(|s| s.filter.as_str() == current)
								>
									{relationship_label(kind).to_string()}
								</option>
							}
						})
						.collect_view()}
				</select>
			</section>

			<section>
				<h2>"布局"</h2>
				<select on:change=move |ev| session.dispatch(Command::SetLayout(event_target_value(&ev)))>
					{LayoutName::ALL
						.into_iter()
						.map(|layout| {
							view! {
								<option
									value=layout.as_str()
									prop:selected=move || state.with(|s| s.layout == layout)
								>
									{layout.label()}
								</option>
							}
						})
						.collect_view()}
				</select>
			</section>

			<section>
				<h2>"添加节点"</h2>
				<input
					type="text"
					placeholder="新节点 ID"
					prop:value=move || state.with(|s| s.new_node.id.clone())
					on:input=move |ev| session.dispatch(Command::SetNewNodeId(event_target_value(&ev)))
				/>
				<select on:change=move |ev| {
					match event_target_value(&ev).parse::<Gender>() {
						Ok(gender) => session.dispatch(Command::SetNewNodeGender(gender)),
						Err(err) => warn!("{err}"),
					}
				}>
					{Gender::ALL
						.into_iter()
						.map(|gender| {
							view! {
								<option
									value=gender.as_str()
									prop:selected=move || state.with(|s| s.new_node.gender == gender)
								>
									{gender.as_str()}
								</option>
							}
						})
						.collect_view()}
				</select>
				<button on:click=move |_| session.dispatch(Command::AddNode)>"添加"</button>
			</section>

			<section>
				<h2>"最短路径"</h2>
				<input
					type="text"
					placeholder="起点"
					prop:value=move || state.with(|s| s.path_query.source.clone())
					on:input=move |ev| session.dispatch(Command::SetPathSource(event_target_value(&ev)))
				/>
				<input
					type="text"
					placeholder="终点"
					prop:value=move || state.with(|s| s.path_query.target.clone())
					on:input=move |ev| session.dispatch(Command::SetPathTarget(event_target_value(&ev)))
				/>
				<button on:click=move |_| session.dispatch(Command::FindPath)>"查找路径"</button>
			</section>

			<section class="actions">
				<button on:click=move |_| session.dispatch(Command::ExportPng)>"导出 PNG"</button>
				<button on:click=move |_| session.dispatch(Command::ExportJson)>"导出 JSON"</button>
				<button on:click=move |_| session.dispatch(Command::ComputeCentrality)>
					"计算中心性"
				</button>
			</section>
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_relationships_have_labels() {
		assert_eq!(relationship_label(&RelationshipKind::Affection), "暧昧");
		assert_eq!(relationship_label(&RelationshipKind::from("FRIEND")), "FRIEND");
	}
}
