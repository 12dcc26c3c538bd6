use super::view::{Action, View};
use crate::config::ColorScheme;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// What a single-line prompt collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Repository,
    Commit,
    Branch,
    Command,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::Repository => "Open repository",
            PromptKind::Commit => "Commit message",
            PromptKind::Branch => "New branch",
            PromptKind::Command => "Run git command",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            PromptKind::Repository => "Enter: open  Up/Down: recent  Esc: cancel",
            PromptKind::Commit => "Enter: commit  Esc: cancel",
            PromptKind::Branch => "Enter: create and switch  Esc: cancel",
            PromptKind::Command => "Enter: run  Esc: cancel",
        }
    }
}

/// Single-line text input overlay.
pub struct Prompt {
    kind: PromptKind,
    input: String,
    /// Values offered with Up/Down, most recent first.
    history: Vec<String>,
    history_index: Option<usize>,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
            history: Vec::new(),
            history_index: None,
        }
    }

    /// Repository prompt offering recently opened paths.
    pub fn repository(recent: &[PathBuf]) -> Self {
        let mut prompt = Self::new(PromptKind::Repository);
        prompt.history = recent.iter().map(|p| p.display().to_string()).collect();
        prompt
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn recall(&mut self, index: Option<usize>) {
        self.history_index = index;
        self.input = index
            .and_then(|i| self.history.get(i))
            .cloned()
            .unwrap_or_default();
    }
}

impl View for Prompt {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Esc => return Ok(Action::Close),
            KeyCode::Enter => return Ok(Action::Submit(self.kind, self.input.clone())),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            KeyCode::Up if !self.history.is_empty() => {
                let next = match self.history_index {
                    Some(i) => (i + 1).min(self.history.len() - 1),
                    None => 0,
                };
                self.recall(Some(next));
            }
            KeyCode::Down if !self.history.is_empty() => {
                let next = match self.history_index {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                self.recall(next);
            }
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(self.title().to_string())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let input = Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.commit_hash)),
            Span::raw(self.input.clone()),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(input), chunks[0]);

        let hint = Paragraph::new(Span::styled(
            self.kind.hint(),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(hint, chunks[1]);
    }

    fn title(&self) -> &str {
        self.kind.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            prompt.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_submit_returns_text() {
        let mut prompt = Prompt::new(PromptKind::Branch);
        type_text(&mut prompt, "feature/x");
        prompt.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)).unwrap(),
            Action::Submit(PromptKind::Branch, "feature/".to_string())
        );
    }

    #[test]
    fn test_escape_closes() {
        let mut prompt = Prompt::new(PromptKind::Commit);
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)).unwrap(), Action::Close);
    }

    #[test]
    fn test_recent_repositories_cycle() {
        let recent = vec![PathBuf::from("/work/a"), PathBuf::from("/work/b")];
        let mut prompt = Prompt::repository(&recent);

        prompt.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(prompt.input(), "/work/a");
        prompt.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(prompt.input(), "/work/b");
        prompt.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(prompt.input(), "/work/b");
        prompt.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(prompt.input(), "/work/a");
        prompt.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(prompt.input(), "");
    }

    #[test]
    fn test_control_keys_not_inserted() {
        let mut prompt = Prompt::new(PromptKind::Command);
        type_text(&mut prompt, "status");
        prompt
            .handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(prompt.input(), "");
    }
}
