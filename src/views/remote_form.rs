use super::selector::Selector;
use super::view::{Action, View};
use crate::config::ColorScheme;
use crate::dashboard::Mutation;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    Push,
    Pull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Remote,
    Branch,
}

/// Push/pull form: a remote selector and a branch name field.
pub struct RemoteForm {
    operation: RemoteOperation,
    remotes: Selector,
    branch: String,
    field: FormField,
}

impl RemoteForm {
    pub fn new(operation: RemoteOperation, remotes: &[String], branch: Option<&str>) -> Self {
        Self {
            operation,
            remotes: Selector::remotes(remotes),
            branch: branch.unwrap_or_default().to_string(),
            field: FormField::Remote,
        }
    }

    pub fn operation(&self) -> RemoteOperation {
        self.operation
    }

    pub fn remotes(&self) -> &Selector {
        &self.remotes
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The mutation this form submits.
    pub fn mutation(&self) -> Option<Mutation> {
        let remote = self.remotes.selected_value()?.to_string();
        let branch = self.branch.trim().to_string();
        Some(match self.operation {
            RemoteOperation::Push => Mutation::Push {
                remote,
                branch: (!branch.is_empty()).then_some(branch),
            },
            RemoteOperation::Pull => Mutation::Pull { remote, branch },
        })
    }

    fn field_style(&self, field: FormField) -> Style {
        if self.field == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    }
}

impl View for RemoteForm {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action> {
        match key.code {
            KeyCode::Esc => return Ok(Action::Close),
            KeyCode::Enter => {
                return Ok(self.mutation().map_or(Action::None, Action::Dispatch));
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    FormField::Remote => FormField::Branch,
                    FormField::Branch => FormField::Remote,
                };
            }
            _ => match self.field {
                FormField::Remote => match key.code {
                    KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
                        self.remotes.select_previous()
                    }
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
                        self.remotes.select_next()
                    }
                    _ => {}
                },
                FormField::Branch => match key.code {
                    KeyCode::Backspace => {
                        self.branch.pop();
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.branch.push(c)
                    }
                    _ => {}
                },
            },
        }
        Ok(Action::None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme) {
        frame.render_widget(Clear, area);

        let branch_text = if self.branch.is_empty() && self.operation == RemoteOperation::Push {
            "(HEAD)".to_string()
        } else {
            self.branch.clone()
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Remote: ", self.field_style(FormField::Remote)),
                Span::styled(self.remotes.inline_label(), Style::default().fg(colors.commit_hash)),
            ]),
            Line::from(vec![
                Span::styled("Branch: ", self.field_style(FormField::Branch)),
                Span::raw(branch_text),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Tab: next field  Enter: run  Esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(self.title().to_string())
                .borders(Borders::ALL),
        );
        frame.render_widget(paragraph, area);
    }

    fn title(&self) -> &str {
        match self.operation {
            RemoteOperation::Push => "Push",
            RemoteOperation::Pull => "Pull",
        }
    }
}
