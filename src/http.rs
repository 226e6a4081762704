//! Graph endpoint over `fetch`.

use std::time::Duration;

use futures::future::{Either, select};
use futures::pin_mut;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::debug;
use web_sys::AbortController;

use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};
use crate::explorer::GraphSnapshot;
use crate::explorer::api::{GraphApi, decode_graph_response, graph_path};

/// Calls `GET {api_base}/api/graph/{id}` with a hard timeout.
#[derive(Clone, Debug)]
pub struct HttpGraphApi {
	base_url: String,
	timeout: Duration,
}

impl HttpGraphApi {
	pub fn new(config: &ExplorerConfig) -> Self {
		Self {
			base_url: config.api_base.clone(),
			timeout: config.request_timeout(),
		}
	}

	async fn send(&self, url: &str, controller: Option<&AbortController>) -> Result<(u16, String)> {
		let response = Request::get(url)
			.abort_signal(controller.map(|c| c.signal()).as_ref())
			.send()
			.await
			.map_err(|e| ExplorerError::Transport(e.to_string()))?;
		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| ExplorerError::Transport(e.to_string()))?;
		Ok((status, body))
	}
}

/// Runs `request` until `timer` fires. On expiry `on_expire` runs before the
/// timeout error is returned.
async fn with_timeout<T>(
	request: impl Future<Output = Result<T>>,
	timer: impl Future<Output = ()>,
	limit: Duration,
	on_expire: impl FnOnce(),
) -> Result<T> {
	pin_mut!(request, timer);
	match select(request, timer).await {
		Either::Left((result, _)) => result,
		Either::Right(((), _)) => {
			on_expire();
			Err(ExplorerError::Timeout(limit))
		}
	}
}

impl GraphApi for HttpGraphApi {
	async fn fetch_graph(&self, paper_id: &str, depth: Option<u32>) -> Result<GraphSnapshot> {
		let url = format!("{}{}", self.base_url, graph_path(paper_id, depth));
		debug!("GET {url}");

		let controller = AbortController::new().ok();
		let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
		let (status, body) = with_timeout(
			self.send(&url, controller.as_ref()),
			TimeoutFuture::new(millis),
			self.timeout,
			|| {
				debug!("GET {url} timed out, aborting");
				if let Some(controller) = &controller {
					controller.abort();
				}
			},
		)
		.await?;
		debug!("GET {url} -> {status}");
		decode_graph_response(status, &body)
	}
}
