use super::error::{GitError, Result};
use crate::api::CommandOutput;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Run `program` with `args` in `workdir`, capturing both output streams.
///
/// A non-zero exit is not an error: the captured streams carry the outcome.
pub fn run(workdir: &Path, program: &str, args: &[String]) -> Result<CommandOutput> {
    debug!(program, ?args, workdir = %workdir.display(), "running command");

    let output = Command::new(program).args(args).current_dir(workdir).output()?;

    if !output.status.success() {
        warn!(program, ?args, status = %output.status, "command exited unsuccessfully");
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

fn git(workdir: &Path, args: &[String]) -> Result<CommandOutput> {
    run(workdir, "git", args)
}

/// Split a command line on whitespace, keeping quoted sections together.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }

    words
}

/// Git arguments for an operator-typed command; the leading `git` is optional.
pub fn git_args(line: &str) -> Result<Vec<String>> {
    let mut words = split_command_line(line);
    if words.first().map(String::as_str) == Some("git") {
        words.remove(0);
    }
    if words.is_empty() {
        return Err(GitError::EmptyCommand);
    }
    Ok(words)
}

/// Run an operator-typed git command in `workdir`.
pub fn run_git_line(workdir: &Path, line: &str) -> Result<CommandOutput> {
    git(workdir, &git_args(line)?)
}

/// Arguments for `git push <remote> HEAD[:<branch>]`.
pub fn push_args(remote: &str, branch: Option<&str>) -> Vec<String> {
    let refspec = match branch {
        Some(branch) if !branch.is_empty() => format!("HEAD:{}", branch),
        _ => "HEAD".to_string(),
    };
    vec!["push".to_string(), remote.to_string(), refspec]
}

pub fn push(workdir: &Path, remote: &str, branch: Option<&str>) -> Result<CommandOutput> {
    git(workdir, &push_args(remote, branch))
}

/// Arguments for `git pull <remote> [<branch>]`.
pub fn pull_args(remote: &str, branch: &str) -> Vec<String> {
    let mut args = vec!["pull".to_string(), remote.to_string()];
    if !branch.is_empty() {
        args.push(branch.to_string());
    }
    args
}

pub fn pull(workdir: &Path, remote: &str, branch: &str) -> Result<CommandOutput> {
    git(workdir, &pull_args(remote, branch))
}
