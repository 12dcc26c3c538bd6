use super::types::{
    BranchSet, CommandOutput, CommitGraphEntry, CommitRecord, DiffRef, FileDiff, StatusReport,
    TreeNode,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reported by a backend query or mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No repo selected")]
    NoRepository,

    #[error("Invalid repo path: {0}")]
    InvalidRepository(String),

    #[error("{message}")]
    Failed {
        message: String,
        detail: Option<String>,
    },
}

impl QueryError {
    pub fn failed(message: impl Into<String>) -> Self {
        QueryError::Failed {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        QueryError::Failed {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// Diagnostic text to show under the message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            QueryError::Failed { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// The repository service the dashboard talks to.
///
/// Every method may block; callers run them on the blocking pool.
pub trait Backend: Send + Sync {
    /// Currently selected repository, restoring the most recent one if unset.
    fn current_repository(&self) -> Option<PathBuf>;

    /// Recently selected repositories, most recent first.
    fn recent_repositories(&self) -> Vec<PathBuf>;

    /// Make `path` the active repository.
    fn set_repository(&self, path: &Path) -> QueryResult<PathBuf>;

    fn status(&self) -> QueryResult<StatusReport>;

    /// Recent commits, newest first.
    fn history(&self) -> QueryResult<Vec<CommitRecord>>;

    fn branches(&self) -> QueryResult<BranchSet>;

    fn tree(&self) -> QueryResult<TreeNode>;

    fn remotes(&self) -> Vec<String>;

    /// Commits of every ref with ancestry, newest first.
    fn commit_graph(&self) -> QueryResult<Vec<CommitGraphEntry>>;

    fn stage_file(&self, file: &str) -> QueryResult<CommandOutput>;

    fn unstage_file(&self, file: &str) -> QueryResult<CommandOutput>;

    fn stage_all(&self) -> QueryResult<CommandOutput>;

    fn run_command(&self, command: &str) -> QueryResult<CommandOutput>;

    fn commit(&self, message: &str) -> QueryResult<CommandOutput>;

    /// Commit with a message produced by an external generator.
    fn assisted_commit(&self) -> QueryResult<CommandOutput>;

    fn create_branch(&self, name: &str) -> QueryResult<CommandOutput>;

    fn switch_branch(&self, name: &str) -> QueryResult<CommandOutput>;

    /// Push `HEAD` to `remote`, optionally as `branch` there.
    fn push(&self, remote: &str, branch: Option<&str>) -> QueryResult<CommandOutput>;

    fn pull(&self, remote: &str, branch: &str) -> QueryResult<CommandOutput>;

    fn diff(&self, target: &DiffRef, source: &DiffRef) -> QueryResult<Vec<FileDiff>>;
}
