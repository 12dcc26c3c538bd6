use super::error::{GitError, Result};
use git2::Repository as Git2Repo;
use std::path::{Path, PathBuf};

/// A validated repository location.
///
/// git2::Repository is not Send/Sync, so we store the paths and open a fresh
/// handle for each operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Repository {
    /// Path as the operator selected it.
    path: PathBuf,
    /// Root of the working tree.
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `path`.
    ///
    /// Fails when `path` is not a directory or not inside a non-bare repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let invalid = || GitError::NotARepo(path.display().to_string());

        if !path.is_dir() {
            return Err(invalid());
        }

        let repo = Git2Repo::discover(&path).map_err(|_| invalid())?;
        let workdir = repo.workdir().ok_or_else(invalid)?.to_path_buf();

        Ok(Self { path, workdir })
    }

    /// Get the path the repository was selected by
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the root of the working tree
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Open a git2::Repository for synchronous operations
    pub fn open_git2(&self) -> Result<Git2Repo> {
        Ok(Git2Repo::open(&self.workdir)?)
    }

    /// Short name of the checked-out branch, or `None` when HEAD is detached
    /// or the branch has no commits yet.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.open_git2()?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|s| s.to_string()))
    }
}
