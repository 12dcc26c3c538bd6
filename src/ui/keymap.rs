use crate::config::KeyBindings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use tracing::warn;

/// Dashboard-level commands a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Quit,
    Help,
    Refresh,
    OpenRepository,
    NextPanel,
    PreviousPanel,
    RunCommand,
    StageAll,
    Commit,
    AssistedCommit,
    NewBranch,
    SwitchBranch,
    Push,
    Pull,
    Diff,
    Graph,
    Tree,
}

impl Command {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "quit" => Command::Quit,
            "help" => Command::Help,
            "refresh" => Command::Refresh,
            "open_repository" => Command::OpenRepository,
            "next_panel" => Command::NextPanel,
            "previous_panel" => Command::PreviousPanel,
            "run_command" => Command::RunCommand,
            "stage_all" => Command::StageAll,
            "commit" => Command::Commit,
            "assisted_commit" => Command::AssistedCommit,
            "new_branch" => Command::NewBranch,
            "switch_branch" => Command::SwitchBranch,
            "push" => Command::Push,
            "pull" => Command::Pull,
            "diff" => Command::Diff,
            "graph" => Command::Graph,
            "tree" => Command::Tree,
            _ => return None,
        })
    }
}

/// A key plus the modifiers that matter for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyChord {
    /// Parse `q`, `A`, `Enter`, `Tab`, `BackTab`, `Ctrl+r`, `F5`, ...
    pub fn parse(text: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = text.trim();
        loop {
            let lower = rest.to_ascii_lowercase();
            if lower.starts_with("ctrl+") && rest.len() > 5 {
                modifiers |= KeyModifiers::CONTROL;
                rest = &rest[5..];
            } else if lower.starts_with("alt+") && rest.len() > 4 {
                modifiers |= KeyModifiers::ALT;
                rest = &rest[4..];
            } else {
                break;
            }
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backtab" | "shift+tab" => KeyCode::BackTab,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            lower => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                        Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
                        _ => return None,
                    },
                }
            }
        };
        Some(Self { code, modifiers })
    }

    /// Normalize a terminal key event. Shift is already part of the
    /// character (`A`, `?`) so it is not matched separately.
    pub fn from_event(key: KeyEvent) -> Self {
        let mut modifiers = key.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
        if !matches!(key.code, KeyCode::Char(_) | KeyCode::BackTab) {
            modifiers |= key.modifiers & KeyModifiers::SHIFT;
        }
        Self {
            code: key.code,
            modifiers,
        }
    }
}

/// Lookup from key to command, built from the configured bindings.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyChord, Command>,
}

impl Keymap {
    pub fn from_config(config: &KeyBindings) -> Self {
        let mut bindings = HashMap::new();
        for group in [&config.global, &config.working_tree, &config.inspect] {
            for (name, key) in group {
                let Some(command) = Command::from_name(name) else {
                    warn!(name = %name, "unknown command in keybindings");
                    continue;
                };
                let Some(chord) = KeyChord::parse(key) else {
                    warn!(name = %name, key = %key, "unparseable key in keybindings");
                    continue;
                };
                if let Some(previous) = bindings.insert(chord, command) {
                    warn!(key = %key, ?previous, ?command, "key bound twice");
                }
            }
        }
        Self { bindings }
    }

    pub fn command(&self, key: KeyEvent) -> Option<Command> {
        self.bindings.get(&KeyChord::from_event(key)).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeyBindings::default())
    }
}
