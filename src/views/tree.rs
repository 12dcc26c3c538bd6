use super::view::{Action, View};
use super::{Cursor, PanelState};
use crate::api::{QueryResult, TreeNode};
use crate::config::ColorScheme;
use crate::model::{visible_rows, TreeRow};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::collections::HashSet;

/// Expandable file tree of the repository. Directories start collapsed.
pub struct TreeView {
    state: PanelState<TreeNode>,
    expanded: HashSet<String>,
    rows: Vec<TreeRow>,
    cursor: Cursor,
}

impl TreeView {
    pub fn new() -> Self {
        Self {
            state: PanelState::Loading,
            expanded: HashSet::new(),
            rows: Vec::new(),
            cursor: Cursor::default(),
        }
    }

    pub fn state(&self) -> &PanelState<TreeNode> {
        &self.state
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn reset(&mut self) {
        self.state = PanelState::Loading;
        self.expanded.clear();
        self.rows.clear();
        self.cursor.select(None);
    }

    /// Replace the tree. Expansion of directories that still exist is kept.
    pub fn apply(&mut self, result: QueryResult<TreeNode>) {
        self.state =
            PanelState::from_result(result, |root: &TreeNode| root.children().is_empty());
        self.rebuild();
    }

    /// Open a collapsed directory or close an open one.
    pub fn toggle(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
        self.rebuild();
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.cursor.selected().and_then(|i| self.rows.get(i))
    }

    fn rebuild(&mut self) {
        self.rows = match self.state.ready() {
            Some(root) => visible_rows(root, &self.expanded),
            None => Vec::new(),
        };
        self.cursor.clamp(self.rows.len());
    }

    fn row_item(row: &TreeRow, colors: &ColorScheme) -> ListItem<'static> {
        let indent = "  ".repeat(row.depth);
        let line = if row.is_directory {
            let marker = if row.expanded { "▾ " } else { "▸ " };
            Line::from(vec![
                Span::raw(indent),
                Span::styled(marker, Style::default().fg(colors.hunk_header)),
                Span::styled(
                    format!("{}/", row.name),
                    Style::default()
                        .fg(colors.hunk_header)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            Line::from(vec![Span::raw(indent), Span::raw("  "), Span::raw(row.name.clone())])
        };
        ListItem::new(line)
    }
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for TreeView {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        let len = self.rows.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor.next(len),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.previous(len),
            KeyCode::Char('g') | KeyCode::Home => self.cursor.first(len),
            KeyCode::Char('G') | KeyCode::End => self.cursor.last(len),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(row) = self.selected_row().filter(|r| r.is_directory) {
                    let path = row.path.clone();
                    self.toggle(&path);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(row) = self.selected_row().filter(|r| r.expanded) {
                    let path = row.path.clone();
                    self.toggle(&path);
                }
            }
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        let title = match self.state.ready() {
            Some(root) => format!("Files - {} ({} files)", root.name(), root.file_count()),
            None => self.title().to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        let placeholder = match &self.state {
            PanelState::Loading => Some(("Loading files...".to_string(), Color::Yellow)),
            PanelState::Failed(message) => Some((message.clone(), colors.deleted)),
            PanelState::Empty => Some(("Empty repository".to_string(), Color::DarkGray)),
            PanelState::Ready(_) => None,
        };
        if let Some((text, color)) = placeholder {
            let paragraph = Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(color));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self.rows.iter().map(|row| Self::row_item(row, colors)).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(colors.selected);
        frame.render_stateful_widget(list, area, self.cursor.state_mut());
    }

    fn title(&self) -> &str {
        "Files"
    }
}
