use super::selector::Selector;
use super::view::{Action, View};
use crate::api::{BranchSet, DiffLine, DiffRef, FileDiff, LineKind, QueryError};
use crate::config::ColorScheme;
use crate::model::DiffOutcome;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Which selector of the diff modal has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffField {
    Target,
    Source,
}

/// Body of the diff modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffBody {
    Loading,
    Ready(DiffOutcome),
}

/// A diff request issued by the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    pub id: u64,
    pub target: DiffRef,
    pub source: DiffRef,
}

/// Modal comparing two references.
pub struct DiffModal {
    target: Selector,
    source: Selector,
    field: DiffField,
    body: DiffBody,
    /// Id of the latest request; older responses are ignored.
    request_id: u64,
    scroll_offset: usize,
    line_count: usize,
}

impl DiffModal {
    pub fn new() -> Self {
        Self {
            target: Selector::default(),
            source: Selector::default(),
            field: DiffField::Target,
            body: DiffBody::Loading,
            request_id: 0,
            scroll_offset: 0,
            line_count: 0,
        }
    }

    /// Populate both selectors from a fresh branch listing.
    pub fn open(&mut self, branches: &BranchSet, primary_branch: &str) {
        self.target = Selector::diff_targets(branches, primary_branch);
        self.source = Selector::diff_sources(branches);
        self.field = DiffField::Target;
        self.body = DiffBody::Loading;
        self.scroll_offset = 0;
    }

    /// Forget the selectors and body of a previous repository.
    ///
    /// Responses still in flight no longer match the request id.
    pub fn reset(&mut self) {
        let request_id = self.request_id + 1;
        *self = Self {
            request_id,
            ..Self::new()
        };
    }

    pub fn target(&self) -> &Selector {
        &self.target
    }

    pub fn source(&self) -> &Selector {
        &self.source
    }

    pub fn field(&self) -> DiffField {
        self.field
    }

    pub fn body(&self) -> &DiffBody {
        &self.body
    }

    /// Start a request for the current selection.
    ///
    /// Equal target and source are still requested. Returns `None` when there
    /// is no target to compare against.
    pub fn begin_request(&mut self) -> Option<DiffRequest> {
        self.request_id += 1;
        self.scroll_offset = 0;

        let (Some(target), Some(source)) =
            (self.target.selected_value(), self.source.selected_value())
        else {
            self.body = DiffBody::Ready(DiffOutcome::Failed {
                message: "No branch to compare against".to_string(),
                detail: None,
            });
            return None;
        };

        self.body = DiffBody::Loading;
        Some(DiffRequest {
            id: self.request_id,
            target: DiffRef::parse(target),
            source: DiffRef::parse(source),
        })
    }

    /// Show the outcome of request `id`; stale responses are dropped.
    pub fn apply(&mut self, id: u64, outcome: DiffOutcome) -> bool {
        if id != self.request_id {
            return false;
        }
        self.body = DiffBody::Ready(outcome);
        true
    }

    /// Show a failure that happened before any diff could be requested.
    pub fn fail(&mut self, err: QueryError) {
        self.request_id += 1;
        self.body = DiffBody::Ready(DiffOutcome::from(err));
    }

    fn selector_mut(&mut self) -> &mut Selector {
        match self.field {
            DiffField::Target => &mut self.target,
            DiffField::Source => &mut self.source,
        }
    }

    fn build_lines(&self, colors: &ColorScheme) -> Vec<Line<'static>> {
        match &self.body {
            DiffBody::Loading => vec![Line::from(Span::styled(
                "Loading diff...",
                Style::default().fg(Color::Yellow),
            ))],
            DiffBody::Ready(DiffOutcome::NoChanges) => vec![Line::from(Span::styled(
                "No changes found between these references.",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))],
            DiffBody::Ready(DiffOutcome::Failed { message, detail }) => {
                let mut lines = vec![Line::from(Span::styled(
                    format!("Error: {}", message),
                    Style::default()
                        .fg(colors.deleted)
                        .add_modifier(Modifier::BOLD),
                ))];
                if let Some(detail) = detail {
                    lines.extend(detail.lines().map(|l| {
                        Line::from(Span::styled(
                            l.to_string(),
                            Style::default().fg(Color::DarkGray),
                        ))
                    }));
                }
                lines
            }
            DiffBody::Ready(outcome @ DiffOutcome::Changes(files)) => {
                let mut lines = Vec::new();
                for file in files {
                    render_file_to_lines(&mut lines, file, colors);
                }
                let (additions, deletions) = outcome.total_stats();
                lines.push(Line::from(vec![
                    Span::raw(format!("{} file(s) changed, ", files.len())),
                    Span::styled(format!("+{} ", additions), Style::default().fg(colors.added)),
                    Span::styled(format!("-{}", deletions), Style::default().fg(colors.deleted)),
                ]));
                lines
            }
        }
    }

    fn scroll_down(&mut self, amount: usize) {
        let max_scroll = self.line_count.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max_scroll);
    }

    fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    fn selector_line(&self, colors: &ColorScheme) -> Line<'static> {
        let style_for = |field: DiffField| {
            if self.field == field {
                colors.selected
            } else {
                Style::default()
            }
        };
        Line::from(vec![
            Span::raw("Target: "),
            Span::styled(self.target.inline_label(), style_for(DiffField::Target)),
            Span::raw("   Source: "),
            Span::styled(self.source.inline_label(), style_for(DiffField::Source)),
        ])
    }
}

impl Default for DiffModal {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one file's header and change lines
fn render_file_to_lines(lines: &mut Vec<Line<'static>>, file: &FileDiff, colors: &ColorScheme) {
    lines.push(Line::from(vec![
        Span::styled(
            file.file.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", file.stats_summary()),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    for change in &file.changes {
        lines.push(render_diff_line(change, colors));
    }
    lines.push(Line::from(""));
}

/// Render a single diff line
fn render_diff_line(line: &DiffLine, colors: &ColorScheme) -> Line<'static> {
    let style = match line.kind {
        LineKind::Add => Style::default().fg(colors.added),
        LineKind::Delete => Style::default().fg(colors.deleted),
        LineKind::Context => Style::default().fg(colors.context),
        LineKind::Header => Style::default()
            .fg(colors.hunk_header)
            .add_modifier(Modifier::BOLD),
    };
    Line::from(Span::styled(line.content.clone(), style))
}

impl View for DiffModal {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Ok(Action::Close),
            KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    DiffField::Target => DiffField::Source,
                    DiffField::Source => DiffField::Target,
                };
                Ok(Action::None)
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let before = self.selector_mut().selected_index();
                self.selector_mut().select_previous();
                let changed = before != self.selector_mut().selected_index();
                Ok(if changed { Action::RequestDiff } else { Action::None })
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let before = self.selector_mut().selected_index();
                self.selector_mut().select_next();
                let changed = before != self.selector_mut().selected_index();
                Ok(if changed { Action::RequestDiff } else { Action::None })
            }
            KeyCode::Enter | KeyCode::Char('r') => Ok(Action::RequestDiff),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down(1);
                Ok(Action::None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up(1);
                Ok(Action::None)
            }
            KeyCode::Char('g') => {
                self.scroll_offset = 0;
                Ok(Action::None)
            }
            KeyCode::Char('G') => {
                self.scroll_offset = self.line_count.saturating_sub(1);
                Ok(Action::None)
            }
            KeyCode::PageDown => {
                self.scroll_down(20);
                Ok(Action::None)
            }
            KeyCode::PageUp => {
                self.scroll_up(20);
                Ok(Action::None)
            }
            _ => Ok(Action::None),
        }
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
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        frame.render_widget(Paragraph::new(self.selector_line(colors)), chunks[0]);

        let lines = self.build_lines(colors);
        self.line_count = lines.len();
        self.scroll_offset = self.scroll_offset.min(self.line_count.saturating_sub(1));

        let visible_height = chunks[1].height as usize;
        let visible_lines: Vec<Line> = lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .collect();
        frame.render_widget(Paragraph::new(visible_lines), chunks[1]);

        if self.line_count > visible_height {
            let mut state = ScrollbarState::default()
                .content_length(self.line_count)
                .position(self.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                chunks[1],
                &mut state,
            );
        }
    }

    fn title(&self) -> &str {
        "Diff"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn opened() -> DiffModal {
        let mut modal = DiffModal::new();
        let branches = BranchSet::new(
            vec!["dev".to_string(), "main".to_string()],
            Some("dev".to_string()),
        );
        modal.open(&branches, "main");
        modal
    }

    #[test]
    fn test_open_preselects() {
        let modal = opened();
        assert_eq!(modal.target().selected_value(), Some("main"));
        assert_eq!(modal.source().selected_value(), Some("HEAD"));
        assert_eq!(modal.body(), &DiffBody::Loading);
    }

    #[test]
    fn test_reset_drops_previous_result() {
        let mut modal = opened();
        let request = modal.begin_request().unwrap();
        modal.reset();

        assert_eq!(modal.body(), &DiffBody::Loading);
        assert_eq!(modal.target().selected_value(), None);
        assert!(!modal.apply(request.id, DiffOutcome::Changes(vec![])));
        assert_eq!(modal.body(), &DiffBody::Loading);
    }

    #[test]
    fn test_equal_refs_still_requested() {
        let mut modal = DiffModal::new();
        let branches = BranchSet::new(vec!["HEAD".to_string()], None);
        modal.open(&branches, "HEAD");

        let request = modal.begin_request().unwrap();
        assert_eq!(request.target, request.source);
    }

    #[test]
    fn test_stale_response_ignored() {
        let mut modal = opened();
        let first = modal.begin_request().unwrap();
        let second = modal.begin_request().unwrap();

        assert!(!modal.apply(first.id, DiffOutcome::NoChanges));
        assert_eq!(modal.body(), &DiffBody::Loading);

        assert!(modal.apply(second.id, DiffOutcome::Changes(vec![FileDiff::new("a.rs")])));
        assert!(matches!(modal.body(), DiffBody::Ready(DiffOutcome::Changes(_))));
    }

    #[test]
    fn test_changing_selection_requests_diff() {
        let mut modal = opened();
        assert_eq!(modal.handle_key(key(KeyCode::Right)).unwrap(), Action::None);
        assert_eq!(modal.handle_key(key(KeyCode::Left)).unwrap(), Action::RequestDiff);
        assert_eq!(modal.target().selected_value(), Some("dev"));

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(modal.field(), DiffField::Source);
        assert_eq!(modal.handle_key(key(KeyCode::Right)).unwrap(), Action::RequestDiff);
        assert_eq!(modal.source().selected_value(), Some("WORKTREE"));
    }

    #[test]
    fn test_no_target_fails_locally() {
        let mut modal = DiffModal::new();
        modal.open(&BranchSet::default(), "main");
        assert!(modal.begin_request().is_none());
        assert!(matches!(modal.body(), DiffBody::Ready(DiffOutcome::Failed { .. })));
    }
}
