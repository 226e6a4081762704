mod instance;
mod render;
mod state;
mod types;

pub use instance::CanvasRenderer;
pub use types::{GraphData, GraphLink, GraphNode};
