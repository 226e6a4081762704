use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;
use crate::explorer::render::{Navigation, PhysicsOptions, RenderOptions};
use crate::explorer::selection::ClickEvent;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Extra world-space radius around a node that still counts as a hit.
pub const HIT_PADDING: f64 = 4.0;
/// Pointer travel, in pixels, beyond which a press becomes a drag.
pub const CLICK_SLOP: f64 = 4.0;
pub const ZOOM_STEP: f64 = 1.2;
pub const PAN_STEP: f64 = 40.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
const FIT_MARGIN: f64 = 40.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub tooltip: String,
	pub color: String,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: Option<String>,
	/// Inherited from the source node.
	pub color: String,
	pub arrow_to: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	/// Seconds the pointer has rested on `node`.
	pub dwell_t: f64,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub options: RenderOptions,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	edges: Vec<EdgeInfo>,
}

/// Whether an edge gets an arrowhead at its target. Accepts the
/// comma-separated form, e.g. `"to, from"`.
fn points_to(arrows: Option<&str>, default: bool) -> bool {
	arrows.map_or(default, |spec| spec.split(',').any(|part| part.trim() == "to"))
}

fn simulation_parameters(physics: &PhysicsOptions) -> SimulationParameters {
	SimulationParameters {
		force_charge: (physics.gravitational_constant.abs() * 0.075) as f32,
		force_spring: physics.spring_constant as f32,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: (1.0 - physics.damping).clamp(0.0, 1.0) as f32,
	}
}

/// Keyboard binding for view navigation.
pub fn key_navigation(key: &str) -> Option<Navigation> {
	Some(match key {
		"ArrowLeft" => Navigation::Pan { dx: PAN_STEP, dy: 0.0 },
		"ArrowRight" => Navigation::Pan { dx: -PAN_STEP, dy: 0.0 },
		"ArrowUp" => Navigation::Pan { dx: 0.0, dy: PAN_STEP },
		"ArrowDown" => Navigation::Pan { dx: 0.0, dy: -PAN_STEP },
		"+" | "=" => Navigation::ZoomIn,
		"-" | "_" => Navigation::ZoomOut,
		"0" => Navigation::Fit,
		_ => return None,
	})
}

impl ForceGraphState {
	pub fn new(data: &GraphData, options: &RenderOptions, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(simulation_parameters(&options.physics));
		let mut id_to_idx = HashMap::new();
		let mut group_colors: HashMap<&str, &str> = HashMap::new();
		let ring = if data.nodes.len() > 1 {
			options.physics.spring_length
		} else {
			0.0
		};

		for (i, node) in data.nodes.iter().enumerate() {
			let next = group_colors.len();
			let color = match node.group.as_deref() {
				Some(group) => *group_colors
					.entry(group)
					.or_insert(COLORS[next % COLORS.len()]),
				None => COLORS[0],
			};
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let (x, y) = ((ring * angle.cos()) as f32, (ring * angle.sin()) as f32);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					tooltip: node.tooltip.clone(),
					color: color.to_string(),
				},
			});
			id_to_idx.insert(node.id.as_str(), (idx, color));
		}

		let mut edges = Vec::new();
		for link in &data.links {
			if let (Some(&(src, color)), Some(&(tgt, _))) = (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push(EdgeInfo {
					source: src,
					target: tgt,
					label: link.label.clone(),
					color: if options.edges.inherit_color {
						color.to_string()
					} else {
						COLORS[COLORS.len() - 1].to_string()
					},
					arrow_to: points_to(link.arrows.as_deref(), options.edges.arrows_to),
				});
			}
		}

		Self {
			graph,
			options: options.clone(),
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: options.physics.enabled,
		}
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_radius(&self) -> f64 {
		self.options.nodes.size / 2.0
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit = self.node_radius() + HIT_PADDING;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	/// Pointer down: grabs the node under the pointer or starts a pan.
	pub fn press(&mut self, x: f64, y: f64) {
		self.drag.moved = false;
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					self.drag.node_start_x = node.x();
					self.drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active && !self.pan.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
			return;
		}

		let (sx, sy) = if self.drag.active {
			(self.drag.start_x, self.drag.start_y)
		} else {
			(self.pan.start_x, self.pan.start_y)
		};
		if !self.drag.moved && (x - sx).hypot(y - sy) > CLICK_SLOP {
			self.drag.moved = true;
			self.set_hover(None);
		}
		if !self.drag.moved {
			return;
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Pointer up. A press that never turned into a drag is a click.
	pub fn release(&mut self, x: f64, y: f64) -> Option<ClickEvent> {
		let was_pressed = self.drag.active || self.pan.active;
		let click = (was_pressed && !self.drag.moved).then(|| {
			match self.node_at_position(x, y).and_then(|idx| self.node_id(idx)) {
				Some(id) => ClickEvent::node(id),
				None => ClickEvent::empty(),
			}
		});
		self.end_gesture();
		click
	}

	pub fn leave(&mut self) {
		self.end_gesture();
		self.set_hover(None);
	}

	/// Hidden while a drag is under way, when configured.
	pub fn edges_hidden(&self) -> bool {
		self.options.interaction.hide_edges_on_drag
			&& self.drag.moved
			&& (self.drag.active || self.pan.active)
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn navigate(&mut self, command: Navigation) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		match command {
			Navigation::ZoomIn => self.zoom_at(cx, cy, ZOOM_STEP),
			Navigation::ZoomOut => self.zoom_at(cx, cy, 1.0 / ZOOM_STEP),
			Navigation::Fit => self.fit(),
			Navigation::Pan { dx, dy } => {
				self.transform.x += dx;
				self.transform.y += dy;
			}
		}
	}

	/// Scales and centres the view on the bounding box of all nodes.
	pub fn fit(&mut self) {
		let (mut min_x, mut min_y, mut max_x, mut max_y) =
			(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		});
		if min_x > max_x {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		}

		let pad = self.node_radius() + FIT_MARGIN;
		let (bw, bh) = (max_x - min_x + 2.0 * pad, max_y - min_y + 2.0 * pad);
		let k = (self.width / bw).min(self.height / bh).clamp(MIN_ZOOM, MAX_ZOOM.min(1.0));
		let (mx, my) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - mx * k,
			y: self.height / 2.0 - my * k,
			k,
		};
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around for the fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();
		self.hover.dwell_t = 0.0;

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// The hovered node once the tooltip delay has elapsed.
	pub fn tooltip_node(&self) -> Option<DefaultNodeIdx> {
		let delay = f64::from(self.options.interaction.tooltip_delay_ms) / 1000.0;
		self.hover
			.node
			.filter(|_| !self.drag.active && self.hover.dwell_t >= delay)
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
			let pull = (self.options.physics.central_gravity * dt as f64).min(1.0) as f32;
			self.graph.visit_nodes_mut(|node| {
				if !node.data.is_anchor {
					node.data.x -= node.data.x * pull;
					node.data.y -= node.data.y * pull;
				}
			});
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.dwell_t += dt as f64;
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn end_gesture(&mut self) {
		if self.drag.active && self.drag.moved {
			if let Some(idx) = self.drag.node_idx {
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.is_anchor = true;
					}
				});
			}
		}
		self.drag.active = false;
		self.drag.node_idx = None;
		self.drag.moved = false;
		self.pan.active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{GraphLink, GraphNode};

	fn data() -> GraphData {
		let node = |id: &str, group: &str| GraphNode {
			id: id.into(),
			label: id.into(),
			group: Some(group.into()),
			tooltip: id.into(),
		};
		GraphData {
			nodes: vec![node("P1", "central"), node("P2", "cited"), node("P3", "cited")],
			links: vec![
				GraphLink {
					source: "P1".into(),
					target: "P2".into(),
					label: Some("cites".into()),
					arrows: None,
				},
				GraphLink {
					source: "P3".into(),
					target: "P1".into(),
					label: None,
					arrows: Some("from".into()),
				},
			],
		}
	}

	fn state() -> ForceGraphState {
		ForceGraphState::new(&data(), &RenderOptions::default(), 800.0, 600.0)
	}

	#[test]
	fn first_node_sits_on_the_ring() {
		let s = state();
		// ring radius is the spring length, centred on the canvas
		let idx = s.node_at_position(400.0 + 95.0, 300.0).unwrap();
		assert_eq!(s.node_id(idx).as_deref(), Some("P1"));
		assert!(s.node_at_position(400.0, 300.0).is_none());
	}

	#[test]
	fn edges_take_source_colour_and_groups_share_colours() {
		let s = state();
		assert_eq!(s.edges().len(), 2);
		assert_eq!(s.edges()[0].color, COLORS[0]);
		assert_eq!(s.edges()[1].color, COLORS[1]);
		assert_eq!(s.edges()[0].label.as_deref(), Some("cites"));
	}

	#[test]
	fn edge_arrows_follow_the_server_then_the_default() {
		let s = state();
		assert!(s.edges()[0].arrow_to);
		assert!(!s.edges()[1].arrow_to);

		assert!(points_to(Some("to, from"), false));
		assert!(!points_to(Some(""), true));
		assert!(!points_to(None, false));
	}

	#[test]
	fn press_and_release_on_node_is_a_click() {
		let mut s = state();
		s.press(495.0, 300.0);
		s.pointer_move(496.0, 301.0);
		let click = s.release(496.0, 301.0).unwrap();
		assert_eq!(click, ClickEvent::node("P1"));
		assert!(!s.drag.active);
	}

	#[test]
	fn release_on_background_is_an_empty_click() {
		let mut s = state();
		s.press(10.0, 10.0);
		assert_eq!(s.release(10.0, 10.0), Some(ClickEvent::empty()));
	}

	#[test]
	fn dragging_is_not_a_click_and_hides_edges() {
		let mut s = state();
		s.press(495.0, 300.0);
		s.pointer_move(540.0, 330.0);
		assert!(s.edges_hidden());
		assert_eq!(s.release(540.0, 330.0), None);
		assert!(!s.edges_hidden());
		let idx = s.node_at_position(540.0, 330.0).unwrap();
		assert_eq!(s.node_id(idx).as_deref(), Some("P1"));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		s.press(10.0, 10.0);
		s.pointer_move(60.0, 30.0);
		s.release(60.0, 30.0);
		assert_eq!((s.transform.x, s.transform.y), (450.0, 320.0));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..50 {
			s.navigate(Navigation::ZoomIn);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
		for _ in 0..100 {
			s.navigate(Navigation::ZoomOut);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn fit_centres_the_graph() {
		let mut s = state();
		s.navigate(Navigation::Pan { dx: 500.0, dy: -200.0 });
		s.navigate(Navigation::Fit);
		let idx = s.node_at_position(
			s.transform.x + 95.0 * s.transform.k,
			s.transform.y,
		);
		assert!(idx.is_some());
		assert!(s.transform.k <= 1.0);
	}

	#[test]
	fn tooltip_waits_for_delay() {
		let mut s = state();
		s.pointer_move(495.0, 300.0);
		assert!(s.hover.node.is_some());
		s.animation_running = false;
		s.tick(0.1);
		assert!(s.tooltip_node().is_none());
		s.tick(0.25);
		assert!(s.tooltip_node().is_some());
	}

	#[test]
	fn keys_map_to_navigation() {
		assert_eq!(key_navigation("+"), Some(Navigation::ZoomIn));
		assert_eq!(key_navigation("0"), Some(Navigation::Fit));
		assert_eq!(
			key_navigation("ArrowUp"),
			Some(Navigation::Pan { dx: 0.0, dy: PAN_STEP })
		);
		assert_eq!(key_navigation("x"), None);
	}
}
