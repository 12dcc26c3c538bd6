use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for rust-gitdash
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Keybinding configuration, grouped by area of the dashboard
    pub keybindings: KeyBindings,
    /// Color scheme configuration
    pub colors: Colors,
    /// General application settings
    pub settings: Settings,
    /// Push/pull behaviour
    pub remote: RemoteConfig,
    /// External program that commits with a generated message
    pub assisted_commit: AssistedCommit,
}

/// Keybinding configuration: command name to key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyBindings {
    /// Available whatever panel has focus
    pub global: HashMap<String, String>,
    /// Staging and committing
    pub working_tree: HashMap<String, String>,
    /// Diff, graph and tree overlays
    pub inspect: HashMap<String, String>,
}

/// Color configuration for various UI elements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Colors {
    /// Color for added lines in diffs
    pub added: String,
    /// Color for deleted lines in diffs
    pub deleted: String,
    /// Color for hunk and file headers in diffs
    pub hunk_header: String,
    /// Color for diff context lines
    pub context: String,
    /// Color for staged file entries
    pub staged: String,
    /// Color for unstaged file entries
    pub unstaged: String,
    /// Color for commit hashes
    pub commit_hash: String,
    /// Color for dates
    pub date: String,
    /// Color for authors
    pub author: String,
    /// Color for selected items
    pub selected: String,
    /// Color for status bar
    pub status_bar: String,
    /// Lineage graph lane colors, cycled by lane index
    pub lanes: Vec<String>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Number of commits shown in the history panel
    pub history_limit: usize,
    /// Milliseconds between UI ticks
    pub tick_rate_ms: u64,
    /// Branch pre-selected as the diff target
    pub primary_branch: String,
    /// Show ref names next to graph rows
    pub show_lane_labels: bool,
}

/// How push and pull pick their remote and branch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    /// Ask for remote and branch in a form
    #[default]
    Parameterized,
    /// Always use `default_remote` / `default_branch`
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub mode: RemoteMode,
    pub default_remote: String,
    pub default_branch: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistedCommit {
    /// Program run in the repository directory; empty disables assisted commits
    pub command: String,
    pub args: Vec<String>,
}

fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, key)| (name.to_string(), key.to_string()))
        .collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            global: bindings(&[
                ("quit", "q"),
                ("help", "?"),
                ("refresh", "r"),
                ("open_repository", "o"),
                ("next_panel", "Tab"),
                ("previous_panel", "BackTab"),
                ("run_command", ":"),
            ]),
            working_tree: bindings(&[
                ("stage_all", "A"),
                ("commit", "c"),
                ("assisted_commit", "C"),
                ("new_branch", "n"),
                ("switch_branch", "b"),
                ("push", "P"),
                ("pull", "p"),
            ]),
            inspect: bindings(&[("diff", "d"), ("graph", "L"), ("tree", "t")]),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            added: "green".to_string(),
            deleted: "red".to_string(),
            hunk_header: "cyan".to_string(),
            context: "white".to_string(),
            staged: "green".to_string(),
            unstaged: "red".to_string(),
            commit_hash: "yellow".to_string(),
            date: "blue".to_string(),
            author: "magenta".to_string(),
            selected: "black on white".to_string(),
            status_bar: "black on cyan".to_string(),
            lanes: [
                "cyan",
                "light blue",
                "light green",
                "yellow",
                "magenta",
                "light red",
                "light cyan",
                "white",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_limit: 50,
            tick_rate_ms: 100,
            primary_branch: "main".to_string(),
            show_lane_labels: true,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            mode: RemoteMode::Parameterized,
            default_remote: "origin".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

impl Config {
    /// Get the default configuration file path
    /// Returns ~/.config/rust-gitdash/config.yaml on Unix-like systems
    /// Returns %APPDATA%\rust-gitdash\config.yaml on Windows
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.yaml"))
    }

    /// Directory holding the config file and the log
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("rust-gitdash"))
    }

    /// Load configuration from a YAML file
    /// If the file doesn't exist, returns the default configuration
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_file(Self::default_path()?),
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let yaml = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Write a default configuration file at `path` (default location when `None`)
    /// Only creates the file if it doesn't already exist
    pub fn init_default(path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            Config::default().save_to_file(&path)?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.keybindings.global.get("quit"), Some(&"q".to_string()));
        assert_eq!(config.colors.added, "green");
        assert_eq!(config.settings.history_limit, 50);
        assert_eq!(config.settings.primary_branch, "main");
        assert_eq!(config.remote.mode, RemoteMode::Parameterized);
        assert!(config.assisted_commit.command.is_empty());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let original = Config::default();
        original.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "remote:\n  mode: fixed\nsettings:\n  history_limit: 10\n",
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Fixed);
        assert_eq!(config.remote.default_remote, "origin");
        assert_eq!(config.settings.history_limit, 10);
        assert_eq!(config.settings.tick_rate_ms, 100);
        assert_eq!(config.colors, Colors::default());
    }

    #[test]
    fn test_custom_keybindings() {
        let mut config = Config::default();
        config
            .keybindings
            .inspect
            .insert("graph".to_string(), "g".to_string());

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        config.save_to_file(&config_path).unwrap();
        let loaded = Config::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.keybindings.inspect.get("graph"), Some(&"g".to_string()));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "remote: [unclosed").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_init_default_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        Config::init_default(Some(&config_path)).unwrap();
        fs::write(&config_path, "settings:\n  history_limit: 7\n").unwrap();
        Config::init_default(Some(&config_path)).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.settings.history_limit, 7);
    }
}
