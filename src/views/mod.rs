// Dashboard panels, modals and prompts

pub mod diff;
pub mod graph;
pub mod help;
pub mod history;
pub mod prompt;
pub mod remote_form;
pub mod selector;
pub mod transcript;
pub mod tree;
pub mod view;
pub mod working_tree;

pub use diff::{DiffField, DiffModal};
pub use graph::{GraphModal, GraphState};
pub use help::HelpView;
pub use history::HistoryView;
pub use prompt::{Prompt, PromptKind};
pub use remote_form::{RemoteForm, RemoteOperation};
pub use selector::{Selector, SelectorOption, SwitchPicker};
pub use transcript::Transcript;
pub use tree::TreeView;
pub use view::{Action, View};
pub use working_tree::{FileAction, FileList, FileRole, WorkingTreeView};

use crate::api::QueryResult;
use ratatui::widgets::ListState;

/// What a data panel currently shows.
///
/// `Loading` and `Empty` are distinct: a panel never renders an empty
/// container while its data is still in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState<T> {
    Loading,
    Failed(String),
    Empty,
    Ready(T),
}

impl<T> PanelState<T> {
    /// Build the state for a fresh response, replacing whatever was shown.
    pub fn from_result(result: QueryResult<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(data) if is_empty(&data) => PanelState::Empty,
            Ok(data) => PanelState::Ready(data),
            Err(err) => PanelState::Failed(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Selection cursor over a list of known length.
#[derive(Debug, Default, Clone)]
pub struct Cursor {
    state: ListState,
}

impl Cursor {
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn state_mut(&mut self) -> &mut ListState {
        &mut self.state
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    /// Keep the selection inside `0..len`, selecting the first row if unset.
    pub fn clamp(&mut self, len: usize) {
        match (len, self.state.selected()) {
            (0, _) => self.state.select(None),
            (_, None) => self.state.select(Some(0)),
            (len, Some(i)) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn next(&mut self, len: usize) {
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(i));
        self.clamp(len);
    }

    pub fn previous(&mut self, len: usize) {
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(i));
        self.clamp(len);
    }

    pub fn first(&mut self, len: usize) {
        self.state.select(Some(0));
        self.clamp(len);
    }

    pub fn last(&mut self, len: usize) {
        self.state.select(Some(len.saturating_sub(1)));
        self.clamp(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;

    #[test]
    fn test_panel_state_from_result() {
        let empty: PanelState<Vec<u8>> = PanelState::from_result(Ok(vec![]), Vec::is_empty);
        assert_eq!(empty, PanelState::Empty);

        let ready = PanelState::from_result(Ok(vec![1]), Vec::is_empty);
        assert_eq!(ready.ready(), Some(&vec![1]));

        let failed: PanelState<Vec<u8>> =
            PanelState::from_result(Err(QueryError::NoRepository), Vec::is_empty);
        assert_eq!(failed, PanelState::Failed("No repo selected".to_string()));
    }

    #[test]
    fn test_cursor_navigation() {
        let mut cursor = Cursor::default();
        cursor.clamp(3);
        assert_eq!(cursor.selected(), Some(0));

        cursor.next(3);
        cursor.next(3);
        cursor.next(3);
        assert_eq!(cursor.selected(), Some(2));

        cursor.previous(3);
        assert_eq!(cursor.selected(), Some(1));

        cursor.first(3);
        assert_eq!(cursor.selected(), Some(0));
        cursor.last(3);
        assert_eq!(cursor.selected(), Some(2));

        cursor.clamp(1);
        assert_eq!(cursor.selected(), Some(0));
        cursor.clamp(0);
        assert_eq!(cursor.selected(), None);
    }
}
