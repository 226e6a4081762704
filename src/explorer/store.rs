use std::collections::HashSet;

use super::types::GraphSnapshot;

/// Holds exactly one snapshot. Only whole-snapshot replacement mutates it.
#[derive(Debug, Default)]
pub struct GraphStore {
	snapshot: GraphSnapshot,
	ids: HashSet<String>,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Drops the current snapshot and installs `snapshot` in its place.
	pub fn replace(&mut self, snapshot: GraphSnapshot) {
		self.ids = snapshot.nodes.iter().map(|node| node.id.clone()).collect();
		self.snapshot = snapshot;
	}

	pub fn snapshot(&self) -> &GraphSnapshot {
		&self.snapshot
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	pub fn node_count(&self) -> usize {
		self.snapshot.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.snapshot.edges.len()
	}
}
