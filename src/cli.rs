use clap::Parser;
use std::path::PathBuf;

/// Command-line options of the dashboard binary.
#[derive(Debug, Parser)]
#[command(
    name = "rust-gitdash",
    about = "A terminal dashboard for a Git repository",
    version
)]
pub struct Cli {
    /// Repository to open; without it the most recent one is restored
    #[arg(long, short)]
    pub repo: Option<PathBuf>,

    /// Configuration file (default: <config dir>/rust-gitdash/config.yaml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log file (default: <config dir>/rust-gitdash/rust-gitdash.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    pub init_config: bool,
}
