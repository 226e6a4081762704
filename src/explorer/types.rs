use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{ExplorerError, Result};

/// One paper as returned by `/api/graph/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PaperNode {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub group: Option<String>,
	#[serde(default)]
	pub year: Option<i32>,
	#[serde(default)]
	pub authors: Option<Vec<String>>,
	#[serde(default, rename = "abstract")]
	pub abstract_text: Option<String>,
	#[serde(default)]
	pub pdf_url: Option<String>,
}

/// Directed "cites" relation, `from` cites `to`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CitationEdge {
	pub from: String,
	pub to: String,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub arrows: Option<String>,
}

/// A complete node and edge set. Both keys are required on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphSnapshot {
	pub nodes: Vec<PaperNode>,
	pub edges: Vec<CitationEdge>,
}

impl GraphSnapshot {
	/// Checks node ids are unique and every edge endpoint is a known node.
	pub fn validate(&self) -> Result<()> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if node.id.is_empty() {
				return Err(ExplorerError::ContractViolation(
					"node without an id".into(),
				));
			}
			if !ids.insert(node.id.as_str()) {
				return Err(ExplorerError::ContractViolation(format!(
					"duplicate node {}",
					node.id
				)));
			}
		}
		for edge in &self.edges {
			for end in [&edge.from, &edge.to] {
				if !ids.contains(end.as_str()) {
					return Err(ExplorerError::ContractViolation(format!(
						"edge {} -> {} references unknown node {}",
						edge.from, edge.to, end
					)));
				}
			}
		}
		Ok(())
	}
}
