//! Test doubles for the graph endpoint and the rendering engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::api::GraphApi;
use super::render::{Navigation, RenderInstance, RenderOptions, Renderer};
use super::types::{CitationEdge, GraphSnapshot, PaperNode};
use crate::components::force_graph::GraphData;
use crate::error::{ExplorerError, Result};

pub fn node(id: &str, label: &str, year: Option<i32>) -> PaperNode {
	PaperNode {
		id: id.into(),
		label: label.into(),
		year,
		..Default::default()
	}
}

pub fn snapshot(ids: &[&str], edges: &[(&str, &str)]) -> GraphSnapshot {
	GraphSnapshot {
		nodes: ids.iter().map(|id| node(id, id, None)).collect(),
		edges: edges
			.iter()
			.map(|(from, to)| CitationEdge {
				from: from.to_string(),
				to: to.to_string(),
				..Default::default()
			})
			.collect(),
	}
}

type Key = (String, Option<u32>);

/// Answers from a script and records every request.
#[derive(Default)]
pub struct FakeApi {
	responses: RefCell<HashMap<Key, Result<GraphSnapshot>>>,
	calls: RefCell<Vec<Key>>,
}

impl FakeApi {
	pub fn respond(&self, paper_id: &str, depth: Option<u32>, response: Result<GraphSnapshot>) {
		self.responses
			.borrow_mut()
			.insert((paper_id.to_string(), depth), response);
	}

	pub fn calls(&self) -> Vec<Key> {
		self.calls.borrow().clone()
	}
}

impl GraphApi for FakeApi {
	async fn fetch_graph(&self, paper_id: &str, depth: Option<u32>) -> Result<GraphSnapshot> {
		let key = (paper_id.to_string(), depth);
		self.calls.borrow_mut().push(key.clone());
		self.responses
			.borrow()
			.get(&key)
			.cloned()
			.unwrap_or_else(|| Err(ExplorerError::Transport("no scripted response".into())))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
	Created(usize),
	Destroyed(usize),
	Navigated(usize, Navigation),
}

#[derive(Default)]
struct LogInner {
	events: Vec<RenderEvent>,
	next_id: usize,
	live: usize,
	fail_next: Option<String>,
	last_data: Option<GraphData>,
}

/// Shared view of what the fake renderer did.
#[derive(Clone, Default)]
pub struct RenderLog(Rc<RefCell<LogInner>>);

impl RenderLog {
	pub fn events(&self) -> Vec<RenderEvent> {
		self.0.borrow().events.clone()
	}

	pub fn live(&self) -> usize {
		self.0.borrow().live
	}

	pub fn created(&self) -> usize {
		self.0.borrow().next_id
	}

	pub fn last_data(&self) -> Option<GraphData> {
		self.0.borrow().last_data.clone()
	}

	pub fn fail_next(&self, message: &str) {
		self.0.borrow_mut().fail_next = Some(message.to_string());
	}
}

#[derive(Default)]
pub struct FakeRenderer {
	log: RenderLog,
}

impl FakeRenderer {
	pub fn log(&self) -> RenderLog {
		self.log.clone()
	}
}

pub struct FakeInstance {
	id: usize,
	log: RenderLog,
	destroyed: bool,
}

impl Renderer for FakeRenderer {
	type Instance = FakeInstance;

	fn create(&mut self, data: GraphData, _options: &RenderOptions) -> Result<FakeInstance> {
		let mut inner = self.log.0.borrow_mut();
		if let Some(message) = inner.fail_next.take() {
			return Err(ExplorerError::Render(message));
		}
		assert_eq!(inner.live, 0, "an instance is still live");
		let id = inner.next_id;
		inner.next_id += 1;
		inner.live += 1;
		inner.events.push(RenderEvent::Created(id));
		inner.last_data = Some(data);
		Ok(FakeInstance {
			id,
			log: self.log.clone(),
			destroyed: false,
		})
	}
}

impl RenderInstance for FakeInstance {
	fn destroy(&mut self) {
		assert!(!self.destroyed, "instance {} destroyed twice", self.id);
		self.destroyed = true;
		let mut inner = self.log.0.borrow_mut();
		inner.live -= 1;
		inner.events.push(RenderEvent::Destroyed(self.id));
	}

	fn navigate(&mut self, command: Navigation) {
		self.log
			.0
			.borrow_mut()
			.events
			.push(RenderEvent::Navigated(self.id, command));
	}
}
