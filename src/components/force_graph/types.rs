/// Display record for one paper in the canvas engine.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	pub group: Option<String>,
	/// Label, then the year on its own line.
	pub tooltip: String,
}

/// Display record for one citation, `source` cites `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub label: Option<String>,
	/// Arrowhead spec as sent by the server, e.g. `"to"`. `None` falls back
	/// to the configured default.
	pub arrows: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
