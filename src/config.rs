//! Runtime configuration.
//!
//! The page may embed a JSON object in
//! `<script type="application/json" id="explorer-config">`. Every field is
//! optional and falls back to the defaults below.

use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::explorer::render::RenderOptions;

/// Id of the element holding the inline JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "explorer-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Prefix for the graph endpoint. Empty means same origin.
	pub api_base: String,
	/// Depth used when the depth field is left empty.
	pub default_depth: u32,
	pub request_timeout_secs: u64,
	pub render: RenderOptions,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			default_depth: 1,
			request_timeout_secs: 15,
			render: RenderOptions::default(),
		}
	}
}

impl ExplorerConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs.max(1))
	}

	/// Parses inline JSON, keeping defaults when it is malformed.
	pub fn from_json(raw: &str) -> Self {
		match serde_json::from_str::<Self>(raw) {
			Ok(mut config) => {
				config.api_base = config.api_base.trim_end_matches('/').to_string();
				config.default_depth = config.default_depth.max(1);
				config
			}
			Err(e) => {
				warn!("ignoring malformed explorer config: {e}");
				Self::default()
			}
		}
	}

	/// Reads the configuration embedded in the current document.
	pub fn from_document() -> Self {
		let raw = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|el| el.text_content());
		match raw {
			Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw),
			_ => {
				debug!("no inline explorer config, using defaults");
				Self::default()
			}
		}
	}
}
