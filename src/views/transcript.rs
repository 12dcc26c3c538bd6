use super::view::{Action, View};
use crate::api::{CommandOutput, QueryResult};
use crate::config::ColorScheme;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Append-only log of mutation output.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<String>,
    /// Lines scrolled up from the bottom; 0 follows new output.
    scroll_back: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append `text` verbatim, one entry per line.
    fn append_text(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    /// Append the echo line for a command about to run.
    pub fn echo(&mut self, command: &str) {
        self.lines.push(format!("> {}", command));
        self.scroll_back = 0;
    }

    /// Append the outcome of a mutation: stdout, then stderr, unclassified.
    pub fn record(&mut self, result: &QueryResult<CommandOutput>) {
        match result {
            Ok(output) => {
                self.append_text(&output.stdout);
                self.append_text(&output.stderr);
            }
            Err(err) => {
                self.lines.push(format!("error: {}", err));
                if let Some(detail) = err.detail() {
                    self.append_text(detail);
                }
            }
        }
        self.scroll_back = 0;
    }

    fn scroll_up(&mut self, amount: usize) {
        self.scroll_back = (self.scroll_back + amount).min(self.lines.len().saturating_sub(1));
    }

    fn scroll_down(&mut self, amount: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(amount);
    }
}

impl View for Transcript {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(1),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Char('G') | KeyCode::End => self.scroll_back = 0,
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        let visible = area.height.saturating_sub(2) as usize;
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(visible);

        let lines: Vec<Line> = self.lines[start..end]
            .iter()
            .map(|line| {
                if line.starts_with("> ") {
                    Line::from(Span::styled(
                        line.clone(),
                        Style::default()
                            .fg(colors.commit_hash)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else if line.starts_with("error: ") {
                    Line::from(Span::styled(line.clone(), Style::default().fg(colors.deleted)))
                } else {
                    Line::from(line.clone())
                }
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(self.title().to_string()).borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn title(&self) -> &str {
        "Output"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;

    #[test]
    fn test_record_order() {
        let mut transcript = Transcript::new();
        transcript.echo("git push origin HEAD");
        transcript.record(&Ok(CommandOutput {
            stdout: "out 1\nout 2\n".to_string(),
            stderr: "To origin\n".to_string(),
        }));

        assert_eq!(
            transcript.lines(),
            &["> git push origin HEAD", "out 1", "out 2", "To origin"]
        );
    }

    #[test]
    fn test_failures_are_recorded_not_raised() {
        let mut transcript = Transcript::new();
        transcript.echo("git commit -m \"x\"");
        transcript.record(&Err(QueryError::with_detail("Nothing to commit", "clean tree")));
        assert_eq!(transcript.lines()[1], "error: Nothing to commit");
        assert_eq!(transcript.lines()[2], "clean tree");
    }

    #[test]
    fn test_transcript_is_append_only() {
        let mut transcript = Transcript::new();
        transcript.echo("first");
        transcript.echo("second");
        assert_eq!(transcript.lines(), &["> first", "> second"]);
    }
}
