// UI components and terminal management

pub mod app;
pub mod event;
pub mod keymap;
pub mod terminal;

pub use app::{App, Panel};
pub use event::{Event, EventHandler};
pub use keymap::{Command, KeyChord, Keymap};
pub use terminal::Tui;
