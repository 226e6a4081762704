use futures::StreamExt;
use futures::channel::mpsc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::SubmitEvent;

use crate::components::detail_panel::DetailPanel;
use crate::components::force_graph::CanvasRenderer;
use crate::config::ExplorerConfig;
use crate::explorer::{ClickEvent, ExplorerView, Navigation, NoticeKind, Session};
use crate::http::HttpGraphApi;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
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
			<CitationExplorer />
		</ErrorBoundary>
	}
}

/// Search form, graph canvas and detail panel around one [`Session`].
#[component]
fn CitationExplorer() -> impl IntoView {
	let config = ExplorerConfig::from_document();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let explorer_view = RwSignal::new(ExplorerView::default());

	let (clicks_tx, mut clicks_rx) = mpsc::unbounded::<ClickEvent>();
	let session = Session::new(
		HttpGraphApi::new(&config),
		CanvasRenderer::new(canvas_ref, clicks_tx),
		&config,
	)
	.with_observer(move |view| explorer_view.set(view));

	// Each click runs on its own so detail fetches stay independent
	let click_session = session.clone();
	spawn_local(async move {
		while let Some(click) = clicks_rx.next().await {
			let session = click_session.clone();
			spawn_local(async move { session.click(click).await });
		}
	});

	let paper_id = RwSignal::new(String::new());
	let depth = RwSignal::new(config.default_depth.to_string());

	let submit_session = session.clone();
	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let session = submit_session.clone();
		let (id, depth) = (paper_id.get_untracked(), depth.get_untracked());
		spawn_local(async move { session.submit(&id, &depth).await });
	};

	let close_session = session.clone();
	let dismiss_session = session.clone();
	let nav_button = |command: Navigation, label: &'static str, title: &'static str| {
		let session = session.clone();
		view! {
			<button class="nav-button" title=title on:click=move |_| session.navigate(command)>
				{label}
			</button>
		}
	};
	let show_navigation = config.render.interaction.navigation_buttons;

	let panel = Signal::derive(move || explorer_view.with(|v| v.panel.clone()));
	let notice = move || explorer_view.with(|v| v.notice.clone());

	view! {
		<div class="explorer">
			<form class="graph-form" on:submit=on_submit>
				<label>
					"Paper ID "
					<input
						type="text"
						placeholder="e.g. 1706.03762"
						prop:value=move || paper_id.get()
						on:input=move |ev| paper_id.set(event_target_value(&ev))
					/>
				</label>
				<label>
					"Depth "
					<input
						type="number"
						min="1"
						prop:value=move || depth.get()
						on:input=move |ev| depth.set(event_target_value(&ev))
					/>
				</label>
				<button type="submit">"Generate graph"</button>
				<span class="graph-status">
					{move || {
						explorer_view
							.with(|v| {
								if v.loading {
									"Loading graph…".to_string()
								} else if v.node_count > 0 {
									let status = format!("{} papers, {} citations", v.node_count, v.edge_count);
									match &v.selected {
										Some(id) => format!("{status} · selected {id}"),
										None => status,
									}
								} else {
									String::new()
								}
							})
					}}
				</span>
			</form>

			<div
				class="notice"
				class:hidden=move || notice().is_none()
				class:validation=move || {
					notice().is_some_and(|n| n.kind == NoticeKind::Validation)
				}
			>
				<span>{move || notice().map(|n| n.message).unwrap_or_default()}</span>
				<button title="Dismiss" on:click=move |_| dismiss_session.dismiss_notice()>
					"×"
				</button>
			</div>

			<div class="network">
				<canvas node_ref=canvas_ref class="force-graph-canvas" style="display: block; cursor: grab;" />
				<div class="nav-controls" class:hidden=!show_navigation>
					{nav_button(Navigation::Pan { dx: 0.0, dy: 40.0 }, "▲", "Pan up")}
					{nav_button(Navigation::Pan { dx: 40.0, dy: 0.0 }, "◀", "Pan left")}
					{nav_button(Navigation::Pan { dx: -40.0, dy: 0.0 }, "▶", "Pan right")}
					{nav_button(Navigation::Pan { dx: 0.0, dy: -40.0 }, "▼", "Pan down")}
					{nav_button(Navigation::ZoomIn, "+", "Zoom in")}
					{nav_button(Navigation::ZoomOut, "−", "Zoom out")}
					{nav_button(Navigation::Fit, "⤢", "Fit graph")}
				</div>
			</div>

			<DetailPanel panel=panel on_close=move |_| close_session.close_panel() />
		</div>
	}
}
