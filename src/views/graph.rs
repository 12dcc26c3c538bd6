use super::view::{Action, View};
use crate::api::{CommitGraphEntry, QueryResult};
use crate::config::ColorScheme;
use crate::model::{GraphNode, LineageGraph};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const NODE: char = '●';
const LINE: char = '│';
const LEFT_EDGE: char = '╱';
const RIGHT_EDGE: char = '╲';

/// Visibility and data of the lineage graph modal, tracked separately so the
/// modal can be open before its data arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphState {
    Hidden,
    Loading,
    Ready(LineageGraph),
    Failed(String),
}

pub struct GraphModal {
    state: GraphState,
    request_id: u64,
    scroll_offset: usize,
    show_labels: bool,
}

impl GraphModal {
    pub fn new(show_labels: bool) -> Self {
        Self {
            state: GraphState::Hidden,
            request_id: 0,
            scroll_offset: 0,
            show_labels,
        }
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.state, GraphState::Hidden)
    }

    /// Show the modal in its loading state; returns the id of the fetch to issue.
    ///
    /// Any graph from an earlier opening is discarded, never shown stale.
    pub fn open(&mut self) -> u64 {
        self.request_id += 1;
        self.state = GraphState::Loading;
        self.scroll_offset = 0;
        self.request_id
    }

    pub fn hide(&mut self) {
        self.state = GraphState::Hidden;
    }

    /// Replace the graph with the result of fetch `id`.
    ///
    /// Results for an older fetch, or arriving after the modal closed, are dropped.
    pub fn apply(&mut self, id: u64, result: QueryResult<Vec<CommitGraphEntry>>) -> bool {
        if id != self.request_id || !self.is_visible() {
            return false;
        }
        self.state = match result {
            Ok(entries) => GraphState::Ready(LineageGraph::render(entries)),
            Err(err) => GraphState::Failed(err.to_string()),
        };
        true
    }

    pub fn graph(&self) -> Option<&LineageGraph> {
        match &self.state {
            GraphState::Ready(graph) => Some(graph),
            _ => None,
        }
    }

    fn row_count(&self) -> usize {
        self.graph().map_or(0, LineageGraph::len)
    }
}

/// Glyphs for the lane columns of one row.
pub fn lane_glyphs(graph: &LineageGraph, node: &GraphNode) -> Vec<(usize, char)> {
    let passing = graph.passing_lanes(node.row);
    let edges: Vec<usize> = graph
        .connectors()
        .iter()
        .filter(|c| c.from_row == node.row || c.to_row == node.row)
        .map(|c| c.track)
        .filter(|&lane| lane != node.lane)
        .collect();

    (0..graph.lane_count().max(node.lane + 1))
        .map(|lane| {
            let glyph = if lane == node.lane {
                NODE
            } else if passing.contains(&lane) {
                LINE
            } else if edges.contains(&lane) {
                if lane < node.lane { LEFT_EDGE } else { RIGHT_EDGE }
            } else {
                ' '
            };
            (lane, glyph)
        })
        .collect()
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

fn graph_title(graph: &LineageGraph) -> String {
    let mut title = format!("Graph - {} commits, {} lanes", graph.len(), graph.lane_count());
    if graph.dangling_parents() > 0 {
        title.push_str(&format!(", {} parents not loaded", graph.dangling_parents()));
    }
    title
}

impl GraphModal {
    fn build_row(&self, graph: &LineageGraph, node: &GraphNode, colors: &ColorScheme) -> Line<'static> {
        let mut spans = Vec::new();
        for (lane, glyph) in lane_glyphs(graph, node) {
            if lane > 0 {
                spans.push(Span::raw(" "));
            }
            let mut style = Style::default().fg(colors.lane(lane));
            if glyph == NODE {
                style = style.add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(glyph.to_string(), style));
        }

        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            short_hash(&node.entry.hash).to_string(),
            Style::default().fg(colors.commit_hash),
        ));

        if self.show_labels {
            if let Some(label) = graph.lane_label(node.row) {
                spans.push(Span::styled(
                    format!(" [{}]", label),
                    Style::default()
                        .fg(colors.lane(node.lane))
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }

        spans.push(Span::raw(format!(" {}", node.entry.subject)));
        spans.push(Span::styled(
            format!(" - {}", node.entry.author.name),
            Style::default().fg(colors.author),
        ));
        Line::from(spans)
    }
}

impl View for GraphModal {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        let max_scroll = self.row_count().saturating_sub(1);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Close),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = (self.scroll_offset + 1).min(max_scroll)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1)
            }
            KeyCode::PageDown => self.scroll_offset = (self.scroll_offset + 20).min(max_scroll),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(20),
            KeyCode::Char('g') => self.scroll_offset = 0,
            KeyCode::Char('G') => self.scroll_offset = max_scroll,
            _ => {}
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        frame.render_widget(Clear, area);
        let visible_height = area.height.saturating_sub(2) as usize;

        let (title, lines) = match &self.state {
            GraphState::Hidden => return,
            GraphState::Loading => (
                "Graph".to_string(),
                vec![Line::from(Span::styled(
                    "Loading graph...",
                    Style::default().fg(Color::Yellow),
                ))],
            ),
            GraphState::Failed(message) => (
                "Graph - Error".to_string(),
                vec![Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(colors.deleted),
                ))],
            ),
            GraphState::Ready(graph) if graph.is_empty() => (
                "Graph".to_string(),
                vec![Line::from(Span::styled(
                    "No commits",
                    Style::default().fg(Color::DarkGray),
                ))],
            ),
            GraphState::Ready(graph) => (
                graph_title(graph),
                graph
                    .rows_newest_first()
                    .skip(self.scroll_offset)
                    .take(visible_height)
                    .map(|node| self.build_row(graph, node, colors))
                    .collect(),
            ),
        };

        let paragraph =
            Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn title(&self) -> &str {
        "Graph"
    }
}
