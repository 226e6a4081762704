use log::debug;

use super::api::GraphApi;
use super::types::PaperNode;
use crate::error::{ExplorerError, Result};

pub const UNAVAILABLE: &str = "N/A";
pub const NO_ABSTRACT: &str = "No abstract available.";

/// Looks up the full record for `node_id` via the graph endpoint.
///
/// The neighbourhood in the response is ignored. A response without a node
/// whose id equals `node_id` is reported as [`ExplorerError::NotFound`].
pub async fn fetch_detail<A: GraphApi>(api: &A, node_id: &str) -> Result<PaperNode> {
	debug!("requesting details for {node_id}");
	let snapshot = api.fetch_graph(node_id, None).await?;
	snapshot
		.nodes
		.into_iter()
		.find(|node| node.id == node_id)
		.ok_or_else(|| ExplorerError::NotFound(node_id.to_string()))
}

/// What the detail panel shows for one paper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
	pub id: String,
	pub title: String,
	pub authors: String,
	pub year: String,
	pub abstract_text: String,
	pub pdf_url: Option<String>,
}

impl DetailView {
	pub fn from_node(node: &PaperNode) -> Self {
		let authors = match node.authors.as_deref() {
			Some(authors) if !authors.is_empty() => authors.join(", "),
			_ => UNAVAILABLE.to_string(),
		};
		let abstract_text = node
			.abstract_text
			.as_deref()
			.map(str::trim)
			.filter(|a| !a.is_empty())
			.unwrap_or(NO_ABSTRACT)
			.to_string();

		Self {
			id: node.id.clone(),
			title: node.label.clone(),
			authors,
			year: node
				.year
				.map(|y| y.to_string())
				.unwrap_or_else(|| UNAVAILABLE.to_string()),
			abstract_text,
			pdf_url: node.pdf_url.clone().filter(|url| !url.trim().is_empty()),
		}
	}
}
