use super::view::{Action, View};
use super::Cursor;
use crate::api::{BranchSet, DiffRef};
use crate::config::ColorScheme;
use crate::dashboard::Mutation;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// Remote offered when the repository has none configured.
pub const FALLBACK_REMOTE: &str = "origin";

/// One choice of a selector: the value submitted and the label shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

impl SelectorOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    pub fn labelled(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// An ordered set of choices with an optional pre-selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    options: Vec<SelectorOption>,
    selected: Option<usize>,
}

impl Selector {
    pub fn new(options: Vec<SelectorOption>, selected: Option<usize>) -> Self {
        let selected = selected.filter(|&i| i < options.len());
        Self { options, selected }
    }

    /// Remote choices for push/pull; never empty.
    pub fn remotes(remotes: &[String]) -> Self {
        if remotes.is_empty() {
            return Self::new(
                vec![SelectorOption::labelled(
                    FALLBACK_REMOTE,
                    format!("{} (default)", FALLBACK_REMOTE),
                )],
                Some(0),
            );
        }
        Self::new(remotes.iter().map(SelectorOption::new).collect(), Some(0))
    }

    /// Branch choices for switching; the checked-out branch is pre-selected.
    /// With no current branch nothing is pre-selected.
    pub fn switch_branches(branches: &BranchSet) -> Self {
        Self::new(
            branches.branches.iter().map(SelectorOption::new).collect(),
            branches.current_index(),
        )
    }

    /// Diff target choices: `primary` when present, else the first branch.
    pub fn diff_targets(branches: &BranchSet, primary: &str) -> Self {
        let selected = branches
            .branches
            .iter()
            .position(|b| b == primary)
            .or(if branches.branches.is_empty() { None } else { Some(0) });
        Self::new(
            branches.branches.iter().map(SelectorOption::new).collect(),
            selected,
        )
    }

    /// Diff source choices: HEAD (pre-selected), the working tree, then branches.
    pub fn diff_sources(branches: &BranchSet) -> Self {
        let mut options = vec![
            SelectorOption::labelled(DiffRef::HEAD, "Current (HEAD)"),
            SelectorOption::labelled(DiffRef::WORKTREE, "Working Tree (Unstaged)"),
        ];
        options.extend(branches.branches.iter().map(SelectorOption::new));
        Self::new(options, Some(0))
    }

    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&SelectorOption> {
        self.selected.and_then(|i| self.options.get(i))
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.selected().map(|o| o.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Move to the next option, stopping at the last one.
    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(self.options.len() - 1),
            None => 0,
        });
    }

    /// Move to the previous option, stopping at the first one.
    pub fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Text for an inline `< label >` control.
    pub fn inline_label(&self) -> String {
        match self.selected() {
            Some(option) => format!("< {} >", option.label),
            None if self.options.is_empty() => "(none)".to_string(),
            None => "< select >".to_string(),
        }
    }
}

/// Overlay listing local branches to check one out.
pub struct SwitchPicker {
    selector: Selector,
    cursor: Cursor,
}

impl SwitchPicker {
    pub fn new(branches: &BranchSet) -> Self {
        let selector = Selector::switch_branches(branches);
        let mut cursor = Cursor::default();
        cursor.select(selector.selected_index());
        Self { selector, cursor }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl View for SwitchPicker {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(Action::Close),
            KeyCode::Char('j') | KeyCode::Down => self.selector.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.selector.select_previous(),
            KeyCode::Enter => {
                return Ok(match self.selector.selected_value() {
                    Some(name) => Action::Dispatch(Mutation::SwitchBranch(name.to_string())),
                    None => Action::None,
                });
            }
            _ => {}
        }
        self.cursor.select(self.selector.selected_index());
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        let block = Block::default()
            .title(self.title().to_string())
            .borders(Borders::ALL);
        frame.render_widget(Clear, area);

        if self.selector.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                "No local branches",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .selector
            .options()
            .iter()
            .map(|option| ListItem::new(option.label.clone()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(colors.selected)
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, self.cursor.state_mut());
    }

    fn title(&self) -> &str {
        "Switch branch"
    }
}
