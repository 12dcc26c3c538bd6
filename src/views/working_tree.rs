use super::view::{Action, View};
use super::{Cursor, PanelState};
use crate::api::{FileStatusEntry, QueryResult, StatusReport};
use crate::config::ColorScheme;
use crate::dashboard::Mutation;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Which list a file entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Staged,
    Unstaged,
}

impl FileRole {
    pub fn title(&self) -> &'static str {
        match self {
            FileRole::Staged => "Staged",
            FileRole::Unstaged => "Unstaged",
        }
    }

    /// The single action offered for every entry in this list.
    pub fn action(&self) -> FileAction {
        match self {
            FileRole::Staged => FileAction::Unstage,
            FileRole::Unstaged => FileAction::Stage,
        }
    }

    fn color(&self, colors: &ColorScheme) -> Color {
        match self {
            FileRole::Staged => colors.staged,
            FileRole::Unstaged => colors.unstaged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Stage,
    Unstage,
}

impl FileAction {
    pub fn label(&self) -> &'static str {
        match self {
            FileAction::Stage => "stage",
            FileAction::Unstage => "unstage",
        }
    }

    pub fn mutation(&self, file: &str) -> Mutation {
        match self {
            FileAction::Stage => Mutation::Stage(file.to_string()),
            FileAction::Unstage => Mutation::Unstage(file.to_string()),
        }
    }
}

/// One rendered row of a file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListItem {
    pub entry: FileStatusEntry,
    pub action: FileAction,
}

/// A file list ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileList {
    /// Confirmed empty: shown as an explicit "No files" placeholder.
    Empty,
    Entries(Vec<FileListItem>),
}

/// Pair each entry with the action its list offers.
///
/// The action comes from `role` alone; status codes are never inspected.
pub fn render_file_list(entries: &[FileStatusEntry], role: FileRole) -> FileList {
    if entries.is_empty() {
        return FileList::Empty;
    }
    let action = role.action();
    FileList::Entries(
        entries
            .iter()
            .map(|entry| FileListItem {
                entry: entry.clone(),
                action,
            })
            .collect(),
    )
}

/// One of the two working-tree panels.
pub struct FileListView {
    role: FileRole,
    state: PanelState<FileList>,
    cursor: Cursor,
}

impl FileListView {
    pub fn new(role: FileRole) -> Self {
        Self {
            role,
            state: PanelState::Loading,
            cursor: Cursor::default(),
        }
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn state(&self) -> &PanelState<FileList> {
        &self.state
    }

    /// Entries currently listed; empty unless the panel is ready.
    pub fn items(&self) -> &[FileListItem] {
        match &self.state {
            PanelState::Ready(FileList::Entries(items)) => items,
            _ => &[],
        }
    }

    /// Replace the whole list with a fresh response.
    fn set(&mut self, state: PanelState<FileList>) {
        self.state = state;
        self.cursor.clamp(self.items().len());
    }

    pub fn selected_item(&self) -> Option<&FileListItem> {
        self.cursor.selected().and_then(|i| self.items().get(i))
    }

    /// Select the entry for `file`, if listed.
    pub fn select_file(&mut self, file: &str) -> bool {
        match self.items().iter().position(|item| item.entry.file == file) {
            Some(i) => {
                self.cursor.select(Some(i));
                true
            }
            None => false,
        }
    }

    fn placeholder(&self, colors: &ColorScheme) -> Option<Paragraph<'static>> {
        let (text, style) = match &self.state {
            PanelState::Loading => ("Loading...".to_string(), Style::default().fg(Color::Yellow)),
            PanelState::Failed(message) => (message.clone(), Style::default().fg(colors.deleted)),
            PanelState::Empty | PanelState::Ready(FileList::Empty) => (
                "No files".to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
            PanelState::Ready(FileList::Entries(_)) => return None,
        };
        Some(Paragraph::new(text).style(style))
    }
}

impl View for FileListView {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        let len = self.items().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor.next(len),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.previous(len),
            KeyCode::Char('g') | KeyCode::Home => self.cursor.first(len),
            KeyCode::Char('G') | KeyCode::End => self.cursor.last(len),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(item) = self.selected_item() {
                    return Ok(Action::Dispatch(item.action.mutation(&item.entry.file)));
                }
            }
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        let count = self.items().len();
        let title = if count > 0 {
            format!("{} ({})", self.title(), count)
        } else {
            self.title().to_string()
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if let Some(placeholder) = self.placeholder(colors) {
            frame.render_widget(placeholder.block(block), area);
            return;
        }

        let color = self.role.color(colors);
        let items: Vec<ListItem> = self
            .items()
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>2} ", item.entry.status),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(item.entry.file.clone(), Style::default().fg(color)),
                    Span::styled(
                        format!("  [{}]", item.action.label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(colors.selected)
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, self.cursor.state_mut());
    }

    fn title(&self) -> &str {
        self.role.title()
    }
}

/// Staged and unstaged panels, always replaced together from one status fetch.
pub struct WorkingTreeView {
    staged: FileListView,
    unstaged: FileListView,
}

impl WorkingTreeView {
    pub fn new() -> Self {
        Self {
            staged: FileListView::new(FileRole::Staged),
            unstaged: FileListView::new(FileRole::Unstaged),
        }
    }

    /// Back to the loading state, dropping whatever was listed.
    pub fn reset(&mut self) {
        self.staged.set(PanelState::Loading);
        self.unstaged.set(PanelState::Loading);
    }

    /// Apply a status response to both panels.
    pub fn apply_status(&mut self, result: QueryResult<StatusReport>) {
        match result {
            Ok(report) => {
                self.staged.set(PanelState::Ready(render_file_list(
                    &report.staged,
                    FileRole::Staged,
                )));
                self.unstaged.set(PanelState::Ready(render_file_list(
                    &report.unstaged,
                    FileRole::Unstaged,
                )));
            }
            Err(err) => {
                let message = err.to_string();
                self.staged.set(PanelState::Failed(message.clone()));
                self.unstaged.set(PanelState::Failed(message));
            }
        }
    }

    pub fn list(&self, role: FileRole) -> &FileListView {
        match role {
            FileRole::Staged => &self.staged,
            FileRole::Unstaged => &self.unstaged,
        }
    }

    pub fn list_mut(&mut self, role: FileRole) -> &mut FileListView {
        match role {
            FileRole::Staged => &mut self.staged,
            FileRole::Unstaged => &mut self.unstaged,
        }
    }

    /// Files listed under `role`, in display order.
    pub fn files(&self, role: FileRole) -> Vec<&str> {
        self.list(role)
            .items()
            .iter()
            .map(|item| item.entry.file.as_str())
            .collect()
    }
}

impl Default for WorkingTreeView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn report(staged: &[(&str, &str)], unstaged: &[(&str, &str)]) -> StatusReport {
        let entries = |list: &[(&str, &str)]| {
            list.iter()
                .map(|(status, file)| FileStatusEntry::new(*status, *file))
                .collect()
        };
        StatusReport {
            staged: entries(staged),
            unstaged: entries(unstaged),
        }
    }

    fn render_to_string(view: &mut FileListView) -> String {
        let backend = TestBackend::new(40, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let colors = ColorScheme::default();
        terminal
            .draw(|frame| view.draw(frame, frame.area(), &colors))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_action_depends_only_on_role() {
        let entries = vec![FileStatusEntry::new("M ", "a.rs"), FileStatusEntry::new("??", "b.rs")];

        let FileList::Entries(staged) = render_file_list(&entries, FileRole::Staged) else {
            panic!("expected entries");
        };
        assert!(staged.iter().all(|item| item.action == FileAction::Unstage));

        let FileList::Entries(unstaged) = render_file_list(&entries, FileRole::Unstaged) else {
            panic!("expected entries");
        };
        assert!(unstaged.iter().all(|item| item.action == FileAction::Stage));
    }

    #[test]
    fn test_empty_list_is_placeholder() {
        assert_eq!(render_file_list(&[], FileRole::Staged), FileList::Empty);
    }

    #[test]
    fn test_loading_then_empty_placeholders() {
        let mut view = WorkingTreeView::new();
        assert!(view.list(FileRole::Staged).state().is_loading());
        assert!(render_to_string(view.list_mut(FileRole::Staged)).contains("Loading..."));

        view.apply_status(Ok(StatusReport::default()));
        for role in [FileRole::Staged, FileRole::Unstaged] {
            assert_eq!(view.list(role).state(), &PanelState::Ready(FileList::Empty));
            let screen = render_to_string(view.list_mut(role));
            assert!(screen.contains("No files"));
            assert!(!screen.contains("Loading"));
        }
    }

    #[test]
    fn test_status_replaces_lists() {
        let mut view = WorkingTreeView::new();
        view.apply_status(Ok(report(&[("A ", "new.rs")], &[(" M", "a.rs"), ("??", "b.rs")])));
        view.apply_status(Ok(report(&[], &[(" M", "a.rs")])));

        assert!(view.files(FileRole::Staged).is_empty());
        assert_eq!(view.files(FileRole::Unstaged), vec!["a.rs"]);
    }

    #[test]
    fn test_failure_shows_message() {
        let mut view = WorkingTreeView::new();
        view.apply_status(Err(QueryError::NoRepository));

        let list = view.list_mut(FileRole::Unstaged);
        assert_eq!(list.state(), &PanelState::Failed("No repo selected".to_string()));
        assert!(render_to_string(list).contains("No repo selected"));
    }

    #[test]
    fn test_enter_dispatches_role_action() {
        let mut view = WorkingTreeView::new();
        view.apply_status(Ok(report(&[("M ", "s.rs")], &[(" M", "u.rs")])));
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

        let action = view.list_mut(FileRole::Unstaged).handle_key(enter).unwrap();
        assert_eq!(action, Action::Dispatch(Mutation::Stage("u.rs".to_string())));

        let action = view.list_mut(FileRole::Staged).handle_key(enter).unwrap();
        assert_eq!(action, Action::Dispatch(Mutation::Unstage("s.rs".to_string())));
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut view = WorkingTreeView::new();
        view.apply_status(Ok(StatusReport::default()));
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            view.list_mut(FileRole::Staged).handle_key(enter).unwrap(),
            Action::None
        );
    }
}
