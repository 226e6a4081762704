/// Click report from the engine: ids of the nodes under the pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClickEvent {
	pub nodes: Vec<String>,
}

impl ClickEvent {
	pub fn node(id: impl Into<String>) -> Self {
		Self {
			nodes: vec![id.into()],
		}
	}

	/// Click on the background or on an edge.
	pub fn empty() -> Self {
		Self::default()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
	#[default]
	Idle,
	Selected(String),
}

/// Effect of applying a click to the selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
	/// Entered `Selected(id)`; a detail fetch is due.
	Select(String),
	/// Left `Selected`; the panel must hide.
	Deselect,
	Unchanged,
}

impl SelectionState {
	pub fn selected(&self) -> Option<&str> {
		match self {
			Self::Selected(id) => Some(id),
			Self::Idle => None,
		}
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selected() == Some(id)
	}

	/// First reported node wins; an empty report deselects.
	pub fn apply(&mut self, event: &ClickEvent) -> Transition {
		match (event.nodes.first(), &*self) {
			(Some(id), _) => {
				*self = Self::Selected(id.clone());
				Transition::Select(id.clone())
			}
			(None, Self::Selected(_)) => {
				*self = Self::Idle;
				Transition::Deselect
			}
			(None, Self::Idle) => Transition::Unchanged,
		}
	}

	pub fn clear(&mut self) {
		*self = Self::Idle;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_click_selects_first_reported_node() {
		let mut state = SelectionState::Idle;
		let event = ClickEvent {
			nodes: vec!["P2".into(), "P3".into()],
		};
		assert_eq!(state.apply(&event), Transition::Select("P2".into()));
		assert_eq!(state, SelectionState::Selected("P2".into()));
	}

	#[test]
	fn clicking_another_node_moves_selection() {
		let mut state = SelectionState::Selected("P1".into());
		assert_eq!(
			state.apply(&ClickEvent::node("P2")),
			Transition::Select("P2".into())
		);
		assert!(state.is_selected("P2"));
	}

	#[test]
	fn empty_click_returns_to_idle() {
		let mut state = SelectionState::Selected("P1".into());
		assert_eq!(state.apply(&ClickEvent::empty()), Transition::Deselect);
		assert_eq!(state, SelectionState::Idle);
		assert_eq!(state.apply(&ClickEvent::empty()), Transition::Unchanged);
	}
}
