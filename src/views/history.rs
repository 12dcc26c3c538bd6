use super::view::{Action, View};
use super::{Cursor, PanelState};
use crate::api::{CommitRecord, QueryResult};
use crate::config::ColorScheme;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Recent commits, newest first.
pub struct HistoryView {
    state: PanelState<Vec<CommitRecord>>,
    cursor: Cursor,
}

impl HistoryView {
    pub fn new() -> Self {
        Self {
            state: PanelState::Loading,
            cursor: Cursor::default(),
        }
    }

    pub fn state(&self) -> &PanelState<Vec<CommitRecord>> {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = PanelState::Loading;
        self.cursor.select(None);
    }

    pub fn apply(&mut self, result: QueryResult<Vec<CommitRecord>>) {
        self.state = PanelState::from_result(result, Vec::is_empty);
        self.cursor.clamp(self.len());
    }

    pub fn commits(&self) -> &[CommitRecord] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.commits().len()
    }

    fn create_list_item(commit: &CommitRecord, colors: &ColorScheme) -> ListItem<'static> {
        ListItem::new(vec![
            Line::from(vec![
                Span::styled(
                    format!("{} ", commit.hash),
                    Style::default().fg(colors.commit_hash),
                ),
                Span::styled(
                    commit.message.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::raw("        "),
                Span::styled(commit.author.clone(), Style::default().fg(colors.author)),
                Span::raw(", "),
                Span::styled(commit.time.clone(), Style::default().fg(colors.date)),
            ]),
        ])
    }
}

impl Default for HistoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for HistoryView {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        let len = self.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor.next(len),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.previous(len),
            KeyCode::Char('g') | KeyCode::Home => self.cursor.first(len),
            KeyCode::Char('G') | KeyCode::End => self.cursor.last(len),
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        let block = Block::default().title(self.title().to_string()).borders(Borders::ALL);

        let placeholder = match &self.state {
            PanelState::Loading => Some(("Loading history...".to_string(), Color::Yellow)),
            PanelState::Failed(message) => Some((message.clone(), colors.deleted)),
            PanelState::Empty => Some(("No commits yet".to_string(), Color::DarkGray)),
            PanelState::Ready(_) => None,
        };
        if let Some((text, color)) = placeholder {
            let paragraph = Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(color));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .commits()
            .iter()
            .map(|commit| Self::create_list_item(commit, colors))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(colors.selected);

        frame.render_stateful_widget(list, area, self.cursor.state_mut());
    }

    fn title(&self) -> &str {
        "History"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;

    fn commit(hash: &str, message: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            author: "Ada".to_string(),
            time: "2 hours ago".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_history_states() {
        let mut view = HistoryView::new();
        assert!(view.state().is_loading());

        view.apply(Ok(vec![]));
        assert_eq!(view.state(), &PanelState::Empty);

        view.apply(Ok(vec![commit("abc1234", "second"), commit("def5678", "first")]));
        assert_eq!(view.commits()[0].message, "second");

        view.apply(Err(QueryError::failed("bad HEAD")));
        assert_eq!(view.state(), &PanelState::Failed("bad HEAD".to_string()));
        assert!(view.commits().is_empty());
    }

    #[test]
    fn test_latest_response_replaces_list() {
        let mut view = HistoryView::new();
        view.apply(Ok(vec![commit("a", "one")]));
        view.apply(Ok(vec![commit("b", "two"), commit("a", "one")]));
        assert_eq!(view.commits().len(), 2);
    }
}
