use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::explorer::DetailView;

/// Side panel with the selected paper's metadata.
///
/// Visible exactly when `panel` holds a value.
#[component]
pub fn DetailPanel(
	#[prop(into)] panel: Signal<Option<DetailView>>,
	on_close: impl FnMut(MouseEvent) + 'static,
) -> impl IntoView {
	let field = move |f: fn(&DetailView) -> String| {
		move || panel.with(|p| p.as_ref().map(f).unwrap_or_default())
	};
	let pdf_url = move || panel.with(|p| p.as_ref().and_then(|p| p.pdf_url.clone()));

	view! {
		<aside
			class="paper-details"
			class:show=move || panel.with(Option::is_some)
			data-paper-id=field(|p| p.id.clone())
		>
			<button class="close-details" title="Close" on:click=on_close>
				"×"
			</button>
			<h2>{field(|p| p.title.clone())}</h2>
			<dl>
				<dt>"Authors"</dt>
				<dd>{field(|p| p.authors.clone())}</dd>
				<dt>"Year"</dt>
				<dd>{field(|p| p.year.clone())}</dd>
				<dt>"Abstract"</dt>
				<dd class="abstract">{field(|p| p.abstract_text.clone())}</dd>
			</dl>
			<a
				class="pdf-link"
				target="_blank"
				rel="noopener"
				href=move || pdf_url().unwrap_or_default()
				style:display=move || if pdf_url().is_some() { "inline" } else { "none" }
			>
				"View PDF"
			</a>
		</aside>
	}
}
