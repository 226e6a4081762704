//! Ownership of the single live engine instance.

use log::debug;
use serde::Deserialize;

use super::types::{GraphSnapshot, PaperNode};
use crate::components::force_graph::{GraphData, GraphLink, GraphNode};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
	pub size: f64,
	pub font_size: f64,
	pub font_color: String,
	pub border_width: f64,
}

impl Default for NodeOptions {
	fn default() -> Self {
		Self {
			size: 16.0,
			font_size: 12.0,
			font_color: "#333".into(),
			border_width: 2.0,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
	None,
	#[default]
	Continuous,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeOptions {
	pub arrows_to: bool,
	/// Edges take the colour of their source node.
	pub inherit_color: bool,
	pub smooth: Smoothing,
	pub font_size: f64,
}

impl Default for EdgeOptions {
	fn default() -> Self {
		Self {
			arrows_to: true,
			inherit_color: true,
			smooth: Smoothing::Continuous,
			font_size: 10.0,
		}
	}
}

/// Force simulation tuning for graphs of tens to low hundreds of nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsOptions {
	pub enabled: bool,
	/// Negative values push nodes apart.
	pub gravitational_constant: f64,
	pub central_gravity: f64,
	pub spring_length: f64,
	pub spring_constant: f64,
	pub damping: f64,
}

impl Default for PhysicsOptions {
	fn default() -> Self {
		Self {
			enabled: true,
			gravitational_constant: -2000.0,
			central_gravity: 0.3,
			spring_length: 95.0,
			spring_constant: 0.04,
			damping: 0.09,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionOptions {
	pub tooltip_delay_ms: u32,
	pub hide_edges_on_drag: bool,
	pub navigation_buttons: bool,
	pub keyboard: bool,
}

impl Default for InteractionOptions {
	fn default() -> Self {
		Self {
			tooltip_delay_ms: 300,
			hide_edges_on_drag: true,
			navigation_buttons: true,
			keyboard: true,
		}
	}
}

/// Layout and interaction policy applied to every instance.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
	pub nodes: NodeOptions,
	pub edges: EdgeOptions,
	pub physics: PhysicsOptions,
	pub interaction: InteractionOptions,
}

/// View commands shared by the navigation buttons and the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Navigation {
	ZoomIn,
	ZoomOut,
	Fit,
	Pan { dx: f64, dy: f64 },
}

/// A live engine instance. `destroy` must release timers and listeners.
pub trait RenderInstance {
	fn destroy(&mut self);

	fn navigate(&mut self, _command: Navigation) {}
}

/// Creates engine instances.
pub trait Renderer {
	type Instance: RenderInstance;

	fn create(&mut self, data: GraphData, options: &RenderOptions) -> Result<Self::Instance>;
}

/// Keeps at most one live instance and always destroys it before creating
/// the next one.
pub struct RenderController<R: Renderer> {
	renderer: R,
	options: RenderOptions,
	live: Option<R::Instance>,
}

impl<R: Renderer> RenderController<R> {
	pub fn new(renderer: R, options: RenderOptions) -> Self {
		Self {
			renderer,
			options,
			live: None,
		}
	}

	/// Replaces the live instance with one built from `snapshot`. When
	/// creation fails the old instance is already gone and none is live.
	pub fn render(&mut self, snapshot: &GraphSnapshot) -> Result<()> {
		self.release();
		let data = display_data(snapshot);
		let instance = self.renderer.create(data, &self.options)?;
		debug!(
			"created graph instance with {} nodes",
			snapshot.nodes.len()
		);
		self.live = Some(instance);
		Ok(())
	}

	pub fn navigate(&mut self, command: Navigation) {
		if let Some(instance) = self.live.as_mut() {
			instance.navigate(command);
		}
	}

	fn release(&mut self) {
		if let Some(mut previous) = self.live.take() {
			previous.destroy();
			debug!("destroyed previous graph instance");
		}
	}
}

impl<R: Renderer> Drop for RenderController<R> {
	fn drop(&mut self) {
		self.release();
	}
}

/// Tooltip: label, then the year in parentheses.
pub fn tooltip(node: &PaperNode) -> String {
	match node.year {
		Some(year) => format!("{}\n({year})", node.label),
		None => format!("{}\n(year unknown)", node.label),
	}
}

/// Maps a snapshot to the engine's display records.
pub fn display_data(snapshot: &GraphSnapshot) -> GraphData {
	let nodes = snapshot
		.nodes
		.iter()
		.map(|node| GraphNode {
			id: node.id.clone(),
			label: node.label.clone(),
			group: node.group.clone(),
			tooltip: tooltip(node),
		})
		.collect();
	let links = snapshot
		.edges
		.iter()
		.map(|edge| GraphLink {
			source: edge.from.clone(),
			target: edge.to.clone(),
			label: edge.label.clone(),
			arrows: edge.arrows.clone(),
		})
		.collect();
	GraphData { nodes, links }
}
