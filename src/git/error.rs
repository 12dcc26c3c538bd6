use crate::api::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("No repo selected")]
    NoRepository,

    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reference not found: {name}")]
    RefNotFound { name: String, detail: String },

    #[error("Nothing to commit")]
    NothingToCommit,

    #[error("Command is empty")]
    EmptyCommand,

    #[error("No assisted commit command configured")]
    AssistantNotConfigured,
}

pub type Result<T> = std::result::Result<T, GitError>;

impl From<GitError> for QueryError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::NoRepository => QueryError::NoRepository,
            GitError::NotARepo(path) => QueryError::InvalidRepository(path),
            GitError::RefNotFound { name, detail } => {
                QueryError::with_detail(format!("Reference not found: {}", name), detail)
            }
            GitError::Git(e) => QueryError::with_detail("Git error", e.message().to_string()),
            other => QueryError::failed(other.to_string()),
        }
    }
}
