//! Explorer state and the async flows that drive it.
//!
//! [`Explorer`] is plain synchronous state: every async flow is split into a
//! `begin_*` step that hands out a ticket and a `finish_*` step that applies
//! the response. Only the newest ticket of each kind is applied, so an older
//! response resolving late is dropped rather than overwriting newer state.
//! [`Session`] runs the flows against a [`GraphApi`] without holding a borrow
//! across an await.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use super::api::GraphApi;
use super::detail::{DetailView, fetch_detail};
use super::loader::{GraphRequest, load_graph};
use super::render::{Navigation, RenderController, Renderer};
use super::selection::{ClickEvent, SelectionState, Transition};
use super::store::GraphStore;
use super::types::{GraphSnapshot, PaperNode};
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
	Validation,
	Failure,
}

/// The single user-visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	pub kind: NoticeKind,
	pub message: String,
}

impl From<&ExplorerError> for Notice {
	fn from(err: &ExplorerError) -> Self {
		let kind = if err.is_validation() {
			NoticeKind::Validation
		} else {
			NoticeKind::Failure
		};
		Self {
			kind,
			message: err.to_string(),
		}
	}
}

/// Plain data the UI renders from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorerView {
	/// `Some` only while a node is selected and its details have loaded.
	pub panel: Option<DetailView>,
	pub notice: Option<Notice>,
	pub loading: bool,
	pub selected: Option<String>,
	pub node_count: usize,
	pub edge_count: usize,
}

#[derive(Debug)]
pub struct LoadTicket {
	seq: u64,
	pub request: GraphRequest,
}

#[derive(Debug)]
pub struct DetailTicket {
	seq: u64,
	pub node_id: String,
}

pub struct Explorer<R: Renderer> {
	default_depth: u32,
	store: GraphStore,
	render: RenderController<R>,
	selection: SelectionState,
	detail: Option<DetailView>,
	notice: Option<Notice>,
	load_seq: u64,
	pending_load: Option<u64>,
	detail_seq: u64,
}

impl<R: Renderer> Explorer<R> {
	pub fn new(renderer: R, config: &ExplorerConfig) -> Self {
		Self {
			default_depth: config.default_depth,
			store: GraphStore::new(),
			render: RenderController::new(renderer, config.render.clone()),
			selection: SelectionState::Idle,
			detail: None,
			notice: None,
			load_seq: 0,
			pending_load: None,
			detail_seq: 0,
		}
	}

	pub fn view(&self) -> ExplorerView {
		ExplorerView {
			panel: self
				.selection
				.selected()
				.and_then(|_| self.detail.clone()),
			notice: self.notice.clone(),
			loading: self.pending_load.is_some(),
			selected: self.selection.selected().map(str::to_string),
			node_count: self.store.node_count(),
			edge_count: self.store.edge_count(),
		}
	}

	/// Shows `err` as the current notice.
	pub fn report(&mut self, err: &ExplorerError) {
		warn!("{err}");
		self.notice = Some(Notice::from(err));
	}

	pub fn dismiss_notice(&mut self) {
		self.notice = None;
	}

	/// Validates form input. Nothing changes when validation fails.
	pub fn begin_load(&mut self, paper_id: &str, depth: &str) -> Result<LoadTicket> {
		let request = GraphRequest::parse(paper_id, depth, self.default_depth)?;
		self.load_seq += 1;
		self.pending_load = Some(self.load_seq);
		self.notice = None;
		Ok(LoadTicket {
			seq: self.load_seq,
			request,
		})
	}

	/// Applies a load result: on success the store is replaced, the selection
	/// cleared and the engine rebuilt; on failure the last good state stays.
	pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<GraphSnapshot>) {
		if ticket.seq != self.load_seq {
			debug!(
				"discarding stale graph response for {}",
				ticket.request.paper_id
			);
			return;
		}
		self.pending_load = None;

		let snapshot = match result {
			Ok(snapshot) => snapshot,
			Err(err) => return self.report(&err),
		};
		info!(
			"loaded graph for {}: {} nodes, {} edges",
			ticket.request.paper_id,
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		self.store.replace(snapshot);
		self.deselect();
		if let Err(err) = self.render.render(self.store.snapshot()) {
			self.report(&err);
		}
	}

	/// Applies a click. Returns a ticket when a detail fetch is due.
	pub fn click(&mut self, event: &ClickEvent) -> Option<DetailTicket> {
		if let Some(id) = event.nodes.first() {
			if !self.store.contains(id) {
				debug!("ignoring click on {id}, not in the current graph");
				return None;
			}
		}
		match self.selection.apply(event) {
			Transition::Select(node_id) => {
				debug!("selected {node_id}");
				self.detail_seq += 1;
				Some(DetailTicket {
					seq: self.detail_seq,
					node_id,
				})
			}
			Transition::Deselect => {
				debug!("selection cleared");
				self.deselect();
				None
			}
			Transition::Unchanged => None,
		}
	}

	/// Equivalent to clicking the empty canvas.
	pub fn close_panel(&mut self) {
		self.click(&ClickEvent::empty());
	}

	/// Fills the panel on success. A failure leaves the panel as it was and
	/// keeps the selection.
	pub fn finish_detail(&mut self, ticket: DetailTicket, result: Result<PaperNode>) {
		if ticket.seq != self.detail_seq || !self.selection.is_selected(&ticket.node_id) {
			debug!("discarding stale details for {}", ticket.node_id);
			return;
		}
		match result {
			Ok(node) => self.detail = Some(DetailView::from_node(&node)),
			Err(err) => self.report(&err),
		}
	}

	pub fn navigate(&mut self, command: Navigation) {
		self.render.navigate(command);
	}

	fn deselect(&mut self) {
		self.selection.clear();
		self.detail = None;
		self.detail_seq += 1;
	}
}

type Observer = Rc<dyn Fn(ExplorerView)>;

/// Shared handle running the load and detail flows.
pub struct Session<A, R: Renderer> {
	api: Rc<A>,
	explorer: Rc<RefCell<Explorer<R>>>,
	observer: Option<Observer>,
}

impl<A, R: Renderer> Clone for Session<A, R> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			explorer: self.explorer.clone(),
			observer: self.observer.clone(),
		}
	}
}

impl<A: GraphApi, R: Renderer> Session<A, R> {
	pub fn new(api: A, renderer: R, config: &ExplorerConfig) -> Self {
		Self {
			api: Rc::new(api),
			explorer: Rc::new(RefCell::new(Explorer::new(renderer, config))),
			observer: None,
		}
	}

	/// Registers a callback receiving the new view after every state change.
	pub fn with_observer(mut self, observer: impl Fn(ExplorerView) + 'static) -> Self {
		self.observer = Some(Rc::new(observer));
		self
	}

	#[cfg(test)]
	fn view(&self) -> ExplorerView {
		self.explorer.borrow().view()
	}

	#[cfg(test)]
	fn with_explorer<T>(&self, f: impl FnOnce(&Explorer<R>) -> T) -> T {
		f(&*self.explorer.borrow())
	}

	/// Validates, fetches, and installs a new graph.
	pub async fn submit(&self, paper_id: &str, depth: &str) {
		let ticket = self.update(|explorer| match explorer.begin_load(paper_id, depth) {
			Ok(ticket) => Some(ticket),
			Err(err) => {
				explorer.report(&err);
				None
			}
		});
		let Some(ticket) = ticket else {
			return;
		};
		let result = load_graph(&*self.api, &ticket.request).await;
		self.update(|explorer| explorer.finish_load(ticket, result));
	}

	/// Handles an engine click, fetching details when a node was hit.
	pub async fn click(&self, event: ClickEvent) {
		let Some(ticket) = self.update(|explorer| explorer.click(&event)) else {
			return;
		};
		let result = fetch_detail(&*self.api, &ticket.node_id).await;
		self.update(|explorer| explorer.finish_detail(ticket, result));
	}

	pub fn close_panel(&self) {
		self.update(Explorer::close_panel);
	}

	pub fn dismiss_notice(&self) {
		self.update(Explorer::dismiss_notice);
	}

	pub fn navigate(&self, command: Navigation) {
		self.explorer.borrow_mut().navigate(command);
	}

	fn update<T>(&self, f: impl FnOnce(&mut Explorer<R>) -> T) -> T {
		let (out, view) = {
			let mut explorer = self.explorer.borrow_mut();
			let out = f(&mut *explorer);
			(out, explorer.view())
		};
		if let Some(observer) = &self.observer {
			observer(view);
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use futures::executor::block_on;

	use super::*;
	use crate::explorer::detail::UNAVAILABLE;
	use crate::explorer::testing::{
		FakeApi, FakeRenderer, RenderEvent, RenderLog, node, snapshot,
	};

	fn session() -> (Session<FakeApi, FakeRenderer>, RenderLog) {
		let renderer = FakeRenderer::default();
		let log = renderer.log();
		let session = Session::new(FakeApi::default(), renderer, &ExplorerConfig::default());
		(session, log)
	}

	fn scenario_graph() -> GraphSnapshot {
		GraphSnapshot {
			nodes: vec![node("P1", "A", Some(2020)), node("P2", "B", Some(2019))],
			edges: snapshot(&["P1", "P2"], &[("P1", "P2")]).edges,
		}
	}

	#[test]
	fn load_then_click_shows_details() {
		let (session, log) = session();
		session.api.respond("P1", Some(2), Ok(scenario_graph()));
		session.api.respond("P2", None, Ok(scenario_graph()));

		block_on(session.submit("P1", "2"));
		let view = session.view();
		assert_eq!((view.node_count, view.edge_count), (2, 1));
		assert_eq!(log.created(), 1);
		let drawn = log.last_data().unwrap();
		assert_eq!(drawn.nodes[1].tooltip, "B\n(2019)");

		block_on(session.click(ClickEvent::node("P2")));
		let view = session.view();
		assert_eq!(view.selected.as_deref(), Some("P2"));
		let panel = view.panel.unwrap();
		assert_eq!(panel.title, "B");
		assert_eq!(panel.year, "2019");
		assert_eq!(panel.authors, UNAVAILABLE);

		let detail_calls: Vec<_> = session
			.api
			.calls()
			.into_iter()
			.filter(|(_, depth)| depth.is_none())
			.collect();
		assert_eq!(detail_calls, vec![("P2".to_string(), None)]);
	}

	#[test]
	fn reload_counts_match_latest_response() {
		let (session, log) = session();
		session.api.respond(
			"P1",
			Some(1),
			Ok(snapshot(&["P1", "P2", "P3"], &[("P1", "P2"), ("P1", "P3")])),
		);
		session.api.respond("Q1", Some(1), Ok(snapshot(&["Q1"], &[])));

		block_on(session.submit("P1", "1"));
		block_on(session.submit("Q1", "1"));

		assert_eq!(session.view().node_count, 1);
		assert_eq!(session.view().edge_count, 0);
		assert_eq!(
			log.events(),
			vec![
				RenderEvent::Created(0),
				RenderEvent::Destroyed(0),
				RenderEvent::Created(1),
			]
		);
		assert_eq!(log.live(), 1);
	}

	#[test]
	fn reloading_the_same_paper_rebuilds_the_instance() {
		let (session, log) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		block_on(session.submit("P1", "1"));

		assert_eq!(log.created(), 2);
		assert_eq!(log.live(), 1);
	}

	#[test]
	fn new_load_clears_selection_and_hides_panel() {
		let (session, _) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		session.api.respond("P2", None, Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		block_on(session.click(ClickEvent::node("P2")));
		assert!(session.view().panel.is_some());

		block_on(session.submit("P1", "1"));
		let view = session.view();
		assert_eq!(view.selected, None);
		assert_eq!(view.panel, None);
		assert_eq!(
			session.with_explorer(|e| e.selection.clone()),
			SelectionState::Idle
		);
	}

	#[test]
	fn empty_click_hides_panel() {
		let (session, _) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		session.api.respond("P1", None, Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		block_on(session.click(ClickEvent::node("P1")));
		assert!(session.view().panel.is_some());

		block_on(session.click(ClickEvent::empty()));
		assert_eq!(session.view().selected, None);
		assert_eq!(session.view().panel, None);
	}

	#[test]
	fn close_panel_deselects() {
		let (session, _) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		session.api.respond("P1", None, Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		block_on(session.click(ClickEvent::node("P1")));
		session.close_panel();
		assert_eq!(session.view().selected, None);
	}

	#[test]
	fn invalid_depth_makes_no_request() {
		let (session, log) = session();
		for depth in ["0", "abc"] {
			block_on(session.submit("P1", depth));
			let notice = session.view().notice.unwrap();
			assert_eq!(notice.kind, NoticeKind::Validation);
		}
		assert!(session.api.calls().is_empty());
		assert_eq!(log.created(), 0);
		assert!(!session.view().loading);
	}

	#[test]
	fn server_error_is_shown_verbatim_and_store_kept() {
		let (session, log) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		session.api.respond(
			"P404",
			Some(1),
			Err(ExplorerError::Server("paper not found".into())),
		);

		block_on(session.submit("P1", "1"));
		block_on(session.submit("P404", "1"));

		let view = session.view();
		assert_eq!(view.notice.unwrap().message, "paper not found");
		assert_eq!(view.node_count, 2);
		assert!(session.with_explorer(|e| e.store.contains("P1")));
		assert_eq!(log.created(), 1);
		assert_eq!(log.live(), 1);
	}

	#[test]
	fn missing_detail_reports_not_found_and_keeps_panel() {
		let (session, _) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		session.api.respond("P1", None, Ok(scenario_graph()));
		session.api.respond("P2", None, Ok(snapshot(&["P9"], &[])));

		block_on(session.submit("P1", "1"));
		block_on(session.click(ClickEvent::node("P1")));
		let before = session.view().panel;
		assert_eq!(before.as_ref().map(|p| p.title.as_str()), Some("A"));

		block_on(session.click(ClickEvent::node("P2")));
		let view = session.view();
		assert_eq!(view.selected.as_deref(), Some("P2"));
		assert_eq!(view.panel, before);
		let notice = view.notice.unwrap();
		assert_eq!(notice.kind, NoticeKind::Failure);
		assert_eq!(
			notice.message,
			ExplorerError::NotFound("P2".into()).to_string()
		);
	}

	#[test]
	fn render_failure_is_reported() {
		let (session, log) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		log.fail_next("graph container is not mounted");

		block_on(session.submit("P1", "1"));
		let notice = session.view().notice.unwrap();
		assert_eq!(notice.message, "Failed to render graph: graph container is not mounted");
		assert_eq!(log.live(), 0);
	}

	#[test]
	fn clicks_on_unknown_nodes_are_ignored() {
		let (session, _) = session();
		session.api.respond("P1", Some(1), Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		block_on(session.click(ClickEvent::node("GONE")));
		assert_eq!(session.view().selected, None);
		assert!(session.api.calls().iter().all(|(_, d)| d.is_some()));
	}

	#[test]
	fn observer_sees_every_change() {
		let seen = Rc::new(Cell::new(0));
		let counter = seen.clone();
		let (session, _) = session();
		let session = session.with_observer(move |_| counter.set(counter.get() + 1));
		session.api.respond("P1", Some(1), Ok(scenario_graph()));

		block_on(session.submit("P1", "1"));
		assert_eq!(seen.get(), 2);
	}

	#[test]
	fn navigation_reaches_live_instance() {
		let (session, log) = session();
		session.navigate(Navigation::ZoomIn);
		session.api.respond("P1", Some(1), Ok(scenario_graph()));
		block_on(session.submit("P1", "1"));
		session.navigate(Navigation::Fit);

		assert_eq!(log.events().last(), Some(&RenderEvent::Navigated(0, Navigation::Fit)));
	}

	fn explorer() -> (Explorer<FakeRenderer>, RenderLog) {
		let renderer = FakeRenderer::default();
		let log = renderer.log();
		(Explorer::new(renderer, &ExplorerConfig::default()), log)
	}

	#[test]
	fn loading_flag_follows_latest_request() {
		let (mut explorer, _) = explorer();
		let ticket = explorer.begin_load("P1", "1").unwrap();
		assert!(explorer.view().loading);
		explorer.finish_load(ticket, Err(ExplorerError::Transport("offline".into())));
		assert!(!explorer.view().loading);
		assert_eq!(
			explorer.view().notice.unwrap().message,
			"Failed to fetch graph data: offline"
		);
	}

	#[test]
	fn stale_graph_response_is_discarded() {
		let (mut explorer, log) = explorer();
		let first = explorer.begin_load("P1", "1").unwrap();
		let second = explorer.begin_load("Q1", "1").unwrap();

		explorer.finish_load(second, Ok(snapshot(&["Q1"], &[])));
		explorer.finish_load(first, Ok(snapshot(&["P1", "P2"], &[("P1", "P2")])));

		assert!(explorer.store.contains("Q1"));
		assert_eq!(explorer.store.node_count(), 1);
		assert_eq!(log.created(), 1);
	}

	#[test]
	fn stale_detail_response_is_discarded() {
		let (mut explorer, _) = explorer();
		let ticket = explorer.begin_load("P1", "1").unwrap();
		explorer.finish_load(ticket, Ok(scenario_graph()));

		let first = explorer.click(&ClickEvent::node("P1")).unwrap();
		let second = explorer.click(&ClickEvent::node("P2")).unwrap();
		explorer.finish_detail(second, Ok(node("P2", "B", Some(2019))));
		explorer.finish_detail(first, Ok(node("P1", "A", Some(2020))));

		assert_eq!(explorer.view().panel.unwrap().title, "B");
	}

	#[test]
	fn detail_arriving_after_deselect_stays_hidden() {
		let (mut explorer, _) = explorer();
		let ticket = explorer.begin_load("P1", "1").unwrap();
		explorer.finish_load(ticket, Ok(scenario_graph()));

		let pending = explorer.click(&ClickEvent::node("P1")).unwrap();
		explorer.click(&ClickEvent::empty());
		explorer.finish_detail(pending, Ok(node("P1", "A", Some(2020))));

		assert_eq!(explorer.view().panel, None);
	}
}
