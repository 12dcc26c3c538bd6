use super::event::Event;
use super::keymap::{Command, Keymap};
use crate::{
    api::Backend,
    config::{ColorScheme, Config},
    dashboard::{Dashboard, DashboardOptions, Mutation},
    views::{
        Action, FileRole, HelpView, PanelState, Prompt, PromptKind, RemoteOperation, SwitchPicker,
        View,
    },
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Panels that can hold keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Unstaged,
    Staged,
    History,
    Output,
    Files,
}

impl Panel {
    fn name(&self) -> &'static str {
        match self {
            Panel::Unstaged => "Unstaged",
            Panel::Staged => "Staged",
            Panel::History => "History",
            Panel::Output => "Output",
            Panel::Files => "Files",
        }
    }
}

/// At most one overlay is shown above the panels.
enum Overlay {
    None,
    Help(HelpView),
    Prompt(Prompt),
    SwitchPicker(SwitchPicker),
    RemoteForm,
    Diff,
    Graph,
    Notice(String),
}

/// Main application state
pub struct App {
    running: bool,
    dashboard: Dashboard,
    keymap: Keymap,
    colors: ColorScheme,
    focus: Panel,
    show_tree: bool,
    overlay: Overlay,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        Self {
            running: true,
            dashboard: Dashboard::new(backend, DashboardOptions::from_config(config)),
            keymap: Keymap::from_config(&config.keybindings),
            colors: ColorScheme::from_config(&config.colors),
            focus: Panel::Unstaged,
            show_tree: false,
            overlay: Overlay::None,
        }
    }

    /// Select `repo`, or restore the repository the backend remembers
    pub fn init(&mut self, repo: Option<PathBuf>) {
        match repo {
            Some(path) => self.dashboard.select_repository(path),
            None => self.dashboard.restore(),
        }
    }

    /// Check if the application should keep running
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn focus(&self) -> Panel {
        self.focus
    }

    /// Handle an event
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) | Event::Tick | Event::Mouse(_) => Ok(()),
        }
    }

    /// Handle a key event
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.running = false;
            return Ok(());
        }

        if matches!(self.overlay, Overlay::None) {
            if let Some(command) = self.keymap.command(key) {
                self.run_command(command);
                return Ok(());
            }
            let action = self.focused_view().handle_key(key)?;
            self.handle_action(action);
            return Ok(());
        }

        let action = match &mut self.overlay {
            Overlay::None | Overlay::Notice(_) => Action::Close,
            Overlay::Help(view) => view.handle_key(key)?,
            Overlay::Prompt(prompt) => prompt.handle_key(key)?,
            Overlay::SwitchPicker(picker) => picker.handle_key(key)?,
            Overlay::RemoteForm => match self.dashboard.remote_form_mut() {
                Some(form) => form.handle_key(key)?,
                None if key.code == KeyCode::Esc => Action::Close,
                None => Action::None,
            },
            Overlay::Diff => self.dashboard.diff_mut().handle_key(key)?,
            Overlay::Graph => self.dashboard.graph_mut().handle_key(key)?,
        };

        self.handle_action(action);
        Ok(())
    }

    fn focused_view(&mut self) -> &mut dyn View {
        match self.focus {
            Panel::Unstaged => self.dashboard.working_tree_mut().list_mut(FileRole::Unstaged),
            Panel::Staged => self.dashboard.working_tree_mut().list_mut(FileRole::Staged),
            Panel::History => self.dashboard.history_mut(),
            Panel::Output => self.dashboard.transcript_mut(),
            Panel::Files => self.dashboard.tree_mut(),
        }
    }

    fn panels(&self) -> Vec<Panel> {
        let mut panels = vec![Panel::Unstaged, Panel::Staged, Panel::History, Panel::Output];
        if self.show_tree {
            panels.insert(0, Panel::Files);
        }
        panels
    }

    fn cycle_focus(&mut self, forward: bool) {
        let panels = self.panels();
        let current = panels.iter().position(|p| *p == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % panels.len()
        } else {
            (current + panels.len() - 1) % panels.len()
        };
        self.focus = panels[next];
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::Quit => self.running = false,
            Command::Help => self.overlay = Overlay::Help(HelpView::new()),
            Command::Refresh => self.dashboard.refresh(),
            Command::OpenRepository => {
                self.overlay = Overlay::Prompt(Prompt::repository(self.dashboard.recent()))
            }
            Command::NextPanel => self.cycle_focus(true),
            Command::PreviousPanel => self.cycle_focus(false),
            Command::RunCommand => self.overlay = Overlay::Prompt(Prompt::new(PromptKind::Command)),
            Command::StageAll => self.dashboard.dispatch(Mutation::StageAll),
            Command::Commit => self.overlay = Overlay::Prompt(Prompt::new(PromptKind::Commit)),
            Command::AssistedCommit => self.dashboard.dispatch(Mutation::AssistedCommit),
            Command::NewBranch => self.overlay = Overlay::Prompt(Prompt::new(PromptKind::Branch)),
            Command::SwitchBranch => {
                self.overlay = match self.dashboard.branches() {
                    PanelState::Ready(set) => Overlay::SwitchPicker(SwitchPicker::new(set)),
                    PanelState::Empty => Overlay::Notice("No local branches".to_string()),
                    PanelState::Failed(message) => Overlay::Notice(message.clone()),
                    PanelState::Loading => Overlay::Notice("Branches are still loading".to_string()),
                }
            }
            Command::Push => self.open_remote_form(RemoteOperation::Push),
            Command::Pull => self.open_remote_form(RemoteOperation::Pull),
            Command::Diff => {
                self.dashboard.open_diff();
                self.overlay = Overlay::Diff;
            }
            Command::Graph => {
                self.dashboard.open_graph();
                self.overlay = Overlay::Graph;
            }
            Command::Tree => {
                self.show_tree = !self.show_tree;
                if self.show_tree {
                    self.dashboard.open_tree();
                    self.focus = Panel::Files;
                } else if self.focus == Panel::Files {
                    self.focus = Panel::Unstaged;
                }
            }
        }
    }

    fn open_remote_form(&mut self, operation: RemoteOperation) {
        if self.dashboard.open_remote_form(operation) {
            self.overlay = Overlay::RemoteForm;
        }
    }

    fn close_overlay(&mut self) {
        match self.overlay {
            Overlay::Graph => self.dashboard.graph_mut().hide(),
            Overlay::RemoteForm => self.dashboard.close_remote_form(),
            _ => {}
        }
        self.overlay = Overlay::None;
    }

    /// Handle an action from a view
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.running = false,
            Action::Close => self.close_overlay(),
            Action::Dispatch(mutation) => {
                if matches!(self.overlay, Overlay::SwitchPicker(_) | Overlay::RemoteForm) {
                    self.close_overlay();
                }
                self.dashboard.dispatch(mutation);
            }
            Action::Submit(kind, text) => {
                self.close_overlay();
                self.submit(kind, text);
            }
            Action::RequestDiff => self.dashboard.request_diff(),
            Action::Notice(message) => self.overlay = Overlay::Notice(message),
        }
    }

    fn submit(&mut self, kind: PromptKind, text: String) {
        let trimmed = text.trim();
        match kind {
            PromptKind::Commit => self.dashboard.dispatch(Mutation::Commit(text)),
            _ if trimmed.is_empty() => {}
            PromptKind::Repository => self.dashboard.select_repository(trimmed),
            PromptKind::Branch => self
                .dashboard
                .dispatch(Mutation::CreateBranch(trimmed.to_string())),
            PromptKind::Command => self
                .dashboard
                .dispatch(Mutation::RunCommand(trimmed.to_string())),
        }
    }

    /// Apply finished backend work and surface queued notices
    pub fn update(&mut self) {
        self.dashboard.poll_updates();
        if matches!(self.overlay, Overlay::None) {
            if let Some(notice) = self.dashboard.take_notice() {
                self.overlay = Overlay::Notice(notice);
            }
        }
    }

    /// Render the application
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Repository and branch
                Constraint::Min(1),    // Panels
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_branch_bar(frame, chunks[0]);
        if self.dashboard.session().is_selected() {
            self.render_panels(frame, chunks[1]);
        } else {
            self.render_welcome(frame, chunks[1]);
        }
        self.render_status_bar(frame, chunks[2]);
        self.render_overlay(frame, chunks[1]);
    }

    fn render_panels(&mut self, frame: &mut Frame, area: Rect) {
        let columns = if self.show_tree {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(35),
                    Constraint::Percentage(40),
                ])
                .split(area)
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(area)
        };

        let (working_area, right_area) = if self.show_tree {
            self.dashboard.tree_mut().draw(frame, columns[0], &self.colors);
            (columns[1], columns[2])
        } else {
            (columns[0], columns[1])
        };

        let working = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(working_area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(right_area);

        let colors = &self.colors;
        let working_tree = self.dashboard.working_tree_mut();
        working_tree
            .list_mut(FileRole::Unstaged)
            .draw(frame, working[0], colors);
        working_tree
            .list_mut(FileRole::Staged)
            .draw(frame, working[1], colors);
        self.dashboard.history_mut().draw(frame, right[0], colors);
        self.dashboard.transcript_mut().draw(frame, right[1], colors);
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No repo selected",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press o to open a repository, ? for help, q to quit."),
        ];
        let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn render_overlay(&mut self, frame: &mut Frame, area: Rect) {
        let colors = &self.colors;
        match &mut self.overlay {
            Overlay::None => {}
            Overlay::Help(view) => view.draw(frame, centered_rect(70, 80, area), colors),
            Overlay::Prompt(prompt) => prompt.draw(frame, centered_rect(60, 20, area), colors),
            Overlay::SwitchPicker(picker) => picker.draw(frame, centered_rect(40, 50, area), colors),
            Overlay::RemoteForm => {
                let popup = centered_rect(50, 30, area);
                match self.dashboard.remote_form_mut() {
                    Some(form) => form.draw(frame, popup, colors),
                    None => {
                        frame.render_widget(Clear, popup);
                        let paragraph = Paragraph::new("Loading remotes...")
                            .style(Style::default().fg(Color::Yellow))
                            .block(Block::default().title("Remote").borders(Borders::ALL));
                        frame.render_widget(paragraph, popup);
                    }
                }
            }
            Overlay::Diff => self
                .dashboard
                .diff_mut()
                .draw(frame, centered_rect(90, 90, area), colors),
            Overlay::Graph => self
                .dashboard
                .graph_mut()
                .draw(frame, centered_rect(90, 90, area), colors),
            Overlay::Notice(message) => {
                let popup = centered_rect(50, 25, area);
                frame.render_widget(Clear, popup);
                let paragraph = Paragraph::new(vec![
                    Line::from(message.clone()),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Press any key",
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title("Notice")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(colors.deleted)),
                );
                frame.render_widget(paragraph, popup);
            }
        }
    }

    /// Render repository and branch line
    fn render_branch_bar(&self, frame: &mut Frame, area: Rect) {
        let repo = self
            .dashboard
            .session()
            .current()
            .map(|handle| handle.to_string())
            .unwrap_or_else(|| "No repo selected".to_string());

        let branch = match self.dashboard.branches() {
            PanelState::Ready(set) => set.current.clone().unwrap_or_else(|| "no branch".to_string()),
            PanelState::Loading => "...".to_string(),
            PanelState::Empty => "no branch".to_string(),
            PanelState::Failed(_) => "unknown".to_string(),
        };

        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(repo, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" | "),
            Span::styled(format!("\u{e0a0} {}", branch), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let busy = if self.dashboard.in_flight() > 0 {
            " | working..."
        } else {
            ""
        };

        let status = Line::from(vec![
            Span::raw(" "),
            Span::styled(self.focus.name(), Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::raw("Tab:panel Enter:stage/unstage c:commit d:diff L:graph ?:help q:quit"),
            Span::raw(busy),
        ]);

        let paragraph = Paragraph::new(status).style(self.colors.status_bar);
        frame.render_widget(paragraph, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
