//! Citation graph model and the flows that load, render and inspect it.

pub mod api;
pub mod detail;
pub mod loader;
pub mod render;
pub mod selection;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::DetailView;
pub use render::Navigation;
pub use selection::ClickEvent;
pub use session::{ExplorerView, NoticeKind, Session};
pub use types::GraphSnapshot;
