use log::debug;

use super::api::GraphApi;
use super::types::GraphSnapshot;
use crate::error::{ExplorerError, Result};

const MISSING_PAPER_ID: &str = "Please enter a paper ID.";
const INVALID_DEPTH: &str = "Depth must be a whole number of at least 1.";

/// A validated graph query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphRequest {
	pub paper_id: String,
	pub depth: u32,
}

impl GraphRequest {
	/// Validates raw form input. An empty depth field means `default_depth`.
	pub fn parse(paper_id: &str, depth: &str, default_depth: u32) -> Result<Self> {
		let paper_id = paper_id.trim();
		if paper_id.is_empty() {
			return Err(ExplorerError::Validation(MISSING_PAPER_ID.into()));
		}

		let depth = depth.trim();
		let depth = if depth.is_empty() {
			default_depth
		} else {
			depth
				.parse::<i64>()
				.ok()
				.filter(|&d| d >= 1)
				.and_then(|d| u32::try_from(d).ok())
				.ok_or_else(|| ExplorerError::Validation(INVALID_DEPTH.into()))?
		};
		if depth < 1 {
			return Err(ExplorerError::Validation(INVALID_DEPTH.into()));
		}

		Ok(Self {
			paper_id: paper_id.to_string(),
			depth,
		})
	}
}

/// Fetches the graph for `request` and checks it against the data contract.
pub async fn load_graph<A: GraphApi>(api: &A, request: &GraphRequest) -> Result<GraphSnapshot> {
	debug!(
		"requesting graph for {} at depth {}",
		request.paper_id, request.depth
	);
	let snapshot = api
		.fetch_graph(&request.paper_id, Some(request.depth))
		.await?;
	snapshot.validate()?;
	debug!(
		"graph for {} received: {} nodes, {} edges",
		request.paper_id,
		snapshot.nodes.len(),
		snapshot.edges.len()
	);
	Ok(snapshot)
}
