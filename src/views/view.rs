use super::prompt::PromptKind;
use crate::config::ColorScheme;
use crate::dashboard::Mutation;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Actions that views can request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action
    None,
    /// Quit the application
    Quit,
    /// Close the current overlay
    Close,
    /// Run a mutating operation against the repository
    Dispatch(Mutation),
    /// A prompt was confirmed with its text
    Submit(PromptKind, String),
    /// Fetch the diff for the modal's current target/source
    RequestDiff,
    /// Show a blocking notice
    Notice(String),
}

/// Trait that all panels and overlays implement
pub trait View {
    /// Handle a key event, returns an action to perform
    fn handle_key(&mut self, key: KeyEvent) -> Result<Action>;

    /// Render the view
    fn draw(&mut self, frame: &mut Frame, area: Rect, colors: &ColorScheme);

    /// Get the view's title
    fn title(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        assert_eq!(Action::Quit, Action::Quit);
        assert_ne!(Action::Quit, Action::None);
        assert_eq!(
            Action::Dispatch(Mutation::StageAll),
            Action::Dispatch(Mutation::StageAll)
        );
    }
}
