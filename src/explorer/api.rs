//! Boundary to the graph endpoint, `GET /api/graph/{paperId}?depth={n}`.

use std::future::Future;

use serde::Deserialize;

use super::types::GraphSnapshot;
use crate::error::{ExplorerError, GENERIC_GRAPH_FAILURE, Result};

/// Anything that can answer a graph query. Implemented over HTTP by
/// [`crate::http::HttpGraphApi`] and by scripted doubles in tests.
pub trait GraphApi {
	/// Fetches the neighbourhood of `paper_id`. `None` leaves the depth to the
	/// server default.
	fn fetch_graph(
		&self,
		paper_id: &str,
		depth: Option<u32>,
	) -> impl Future<Output = Result<GraphSnapshot>>;
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	error: Option<String>,
}

/// Path and query for a graph request, with the id as a single segment.
pub fn graph_path(paper_id: &str, depth: Option<u32>) -> String {
	let id = urlencoding::encode(paper_id);
	match depth {
		Some(depth) => format!("/api/graph/{id}?depth={depth}"),
		None => format!("/api/graph/{id}"),
	}
}

/// Maps a raw status and body to a snapshot or a single readable error.
pub fn decode_graph_response(status: u16, body: &str) -> Result<GraphSnapshot> {
	if (200..300).contains(&status) {
		return serde_json::from_str(body)
			.map_err(|e| ExplorerError::ContractViolation(e.to_string()));
	}
	let message = serde_json::from_str::<ErrorBody>(body)
		.ok()
		.and_then(|b| b.error)
		.filter(|m| !m.trim().is_empty())
		.unwrap_or_else(|| GENERIC_GRAPH_FAILURE.to_string());
	Err(ExplorerError::Server(message))
}
