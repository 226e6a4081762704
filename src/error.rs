//! Failures surfaced by the explorer.
//!
//! Every variant's `Display` is the exact text shown to the user in the
//! notification banner.

use std::time::Duration;

use thiserror::Error;

/// Fallback text when the server fails without an `error` field.
pub const GENERIC_GRAPH_FAILURE: &str = "Failed to fetch graph data.";

/// Result alias used across the explorer.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Everything that can go wrong between a user action and a rendered graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
	/// Bad user input. No request was made.
	#[error("{0}")]
	Validation(String),

	/// The request never produced a response.
	#[error("Failed to fetch graph data: {0}")]
	Transport(String),

	/// The request was aborted after the configured timeout.
	#[error("Request timed out after {} seconds.", .0.as_secs())]
	Timeout(Duration),

	/// Non-2xx response. Carries the server message verbatim.
	#[error("{0}")]
	Server(String),

	/// A success response that does not honour the graph contract.
	#[error("Failed to fetch graph data: malformed response ({0})")]
	ContractViolation(String),

	/// The detail response did not contain the requested paper.
	#[error("Paper details are unavailable: {0} was not in the response.")]
	NotFound(String),

	/// The canvas engine could not be created.
	#[error("Failed to render graph: {0}")]
	Render(String),
}

impl ExplorerError {
	/// Whether the error came from user input rather than the network or engine.
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_message_is_shown_verbatim() {
		let err = ExplorerError::Server("paper not found".into());
		assert_eq!(err.to_string(), "paper not found");
	}

	#[test]
	fn transport_message_includes_cause() {
		let err = ExplorerError::Transport("connection refused".into());
		assert_eq!(
			err.to_string(),
			"Failed to fetch graph data: connection refused"
		);
		assert!(!err.is_validation());
	}

	#[test]
	fn timeout_reports_whole_seconds() {
		let err = ExplorerError::Timeout(Duration::from_millis(15_400));
		assert_eq!(err.to_string(), "Request timed out after 15 seconds.");
	}
}
