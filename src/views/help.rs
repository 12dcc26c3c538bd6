use super::view::{Action, View};
use crate::config::ColorScheme;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("q", "Quit"),
            ("Ctrl+C", "Force quit"),
            ("?", "Show this help"),
            ("Tab", "Focus next panel"),
            ("Shift+Tab", "Focus previous panel"),
            ("r", "Refresh every panel"),
            ("o", "Open a repository"),
            ("Esc", "Close the current overlay"),
        ],
    ),
    (
        "Working Tree",
        &[
            ("j / Down", "Move selection down"),
            ("k / Up", "Move selection up"),
            ("Enter", "Stage or unstage the selected file"),
            ("A", "Stage all changes"),
            ("c", "Commit staged changes"),
            ("C", "Assisted commit"),
        ],
    ),
    (
        "Branches and Remotes",
        &[
            ("b", "Switch branch"),
            ("n", "Create and switch to a new branch"),
            ("P", "Push"),
            ("p", "Pull"),
            (":", "Run a git command"),
        ],
    ),
    (
        "Inspect",
        &[
            ("d", "Compare branches (diff)"),
            ("L", "Lineage graph"),
            ("t", "File tree"),
            ("Tab", "Diff: switch between target and source"),
            ("h / l", "Diff: change the selected reference"),
            ("g / G", "Jump to top / bottom"),
            ("PageUp / PageDown", "Page up / down"),
        ],
    ),
];

/// Help view showing keybindings
pub struct HelpView {
    scroll_offset: usize,
    lines: Vec<Line<'static>>,
}

impl HelpView {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            lines: Self::build_help_lines(),
        }
    }

    fn build_help_lines() -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "rust-gitdash - Help",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (section, bindings) in SECTIONS {
            lines.push(Line::from(Span::styled(
                *section,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
            for (keys, description) in *bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<18}", keys), Style::default().fg(Color::Green)),
                    Span::raw(*description),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from("Press q or Esc to close this help."));
        lines
    }

    fn scroll_down(&mut self, amount: usize) {
        let max_scroll = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max_scroll);
    }

    fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }
}

impl View for HelpView {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => return Ok(Action::Close),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(1),
            KeyCode::Char('g') => self.scroll_offset = 0,
            KeyCode::Char('G') => self.scroll_offset = self.lines.len().saturating_sub(1),
            KeyCode::PageDown => self.scroll_down(20),
            KeyCode::PageUp => self.scroll_up(20),
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _colors: &ColorScheme) {
        frame.render_widget(Clear, area);
        let visible_height = area.height.saturating_sub(2) as usize;

        let visible_lines: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .cloned()
            .collect();

        let paragraph = Paragraph::new(visible_lines)
            .block(Block::default().title(self.title().to_string()).borders(Borders::ALL));
        frame.render_widget(paragraph, area);

        if self.lines.len() > visible_height {
            let mut state = ScrollbarState::default()
                .content_length(self.lines.len())
                .position(self.scroll_offset);
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            frame.render_stateful_widget(
                scrollbar,
                area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut state,
            );
        }
    }

    fn title(&self) -> &str {
        "Help"
    }
}

impl Default for HelpView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_help_lists_every_section() {
        let view = HelpView::new();
        let text: Vec<String> = view.lines.iter().map(|l| l.to_string()).collect();
        for (section, _) in SECTIONS {
            assert!(text.iter().any(|line| line == section));
        }
    }

    #[test]
    fn test_help_scroll_and_close() {
        let mut view = HelpView::new();
        view.handle_key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(view.scroll_offset, view.lines.len() - 1);
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
                .unwrap(),
            Action::Close
        );
    }
}
