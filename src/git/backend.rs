use super::error::{GitError, Result};
use super::repository::Repository;
use super::{branches, command, commit, diff, history, status, tree};
use crate::api::{
    Backend, BranchSet, CommandOutput, CommitGraphEntry, CommitRecord, DiffRef, FileDiff,
    QueryResult, StatusReport, TreeNode,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Most recently selected repositories kept for restore.
pub const RECENT_LIMIT: usize = 10;

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Default)]
struct BackendState {
    current: Option<Repository>,
    recent: Vec<PathBuf>,
}

impl BackendState {
    fn remember(&mut self, path: &Path) {
        self.recent.retain(|p| p != path);
        self.recent.insert(0, path.to_path_buf());
        self.recent.truncate(RECENT_LIMIT);
    }
}

/// Repository backend over a local git repository.
///
/// Queries and index mutations go through git2; push, pull, raw commands and
/// the commit-message assistant run as child processes in the repository.
#[derive(Debug)]
pub struct Git2Backend {
    state: Mutex<BackendState>,
    history_limit: usize,
    assistant: Vec<String>,
}

impl Default for Git2Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Git2Backend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BackendState::default()),
            history_limit: DEFAULT_HISTORY_LIMIT,
            assistant: Vec::new(),
        }
    }

    /// Set the number of commits listed by `history`
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the program (and its arguments) that commits with a generated message
    pub fn with_assistant(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        self.assistant = if program.trim().is_empty() {
            Vec::new()
        } else {
            std::iter::once(program).chain(args).collect()
        };
        self
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn selected(&self) -> Result<Repository> {
        self.state().current.clone().ok_or(GitError::NoRepository)
    }

    /// Run `op` against the selected repository.
    fn with_repo<T>(&self, op: impl FnOnce(&Repository) -> Result<T>) -> QueryResult<T> {
        let repo = self.selected()?;
        Ok(op(&repo)?)
    }
}

impl Backend for Git2Backend {
    fn current_repository(&self) -> Option<PathBuf> {
        let mut state = self.state();
        if state.current.is_none() {
            let remembered = state.recent.first().cloned()?;
            match Repository::open(&remembered) {
                Ok(repo) => {
                    info!(path = %remembered.display(), "restored recent repository");
                    state.current = Some(repo);
                }
                Err(e) => {
                    debug!(path = %remembered.display(), error = %e, "recent repository unavailable");
                    return None;
                }
            }
        }
        state.current.as_ref().map(|repo| repo.path().to_path_buf())
    }

    fn recent_repositories(&self) -> Vec<PathBuf> {
        self.state().recent.clone()
    }

    fn set_repository(&self, path: &Path) -> QueryResult<PathBuf> {
        let repo = Repository::open(path)?;
        let selected = repo.path().to_path_buf();

        let mut state = self.state();
        state.remember(&selected);
        state.current = Some(repo);
        info!(path = %selected.display(), "repository selected");

        Ok(selected)
    }

    fn status(&self) -> QueryResult<StatusReport> {
        self.with_repo(status::load_status)
    }

    fn history(&self) -> QueryResult<Vec<CommitRecord>> {
        let limit = self.history_limit;
        self.with_repo(|repo| history::load_history(repo, limit))
    }

    fn branches(&self) -> QueryResult<BranchSet> {
        self.with_repo(branches::load_branches)
    }

    fn tree(&self) -> QueryResult<TreeNode> {
        self.with_repo(|repo| tree::load_tree(repo.path()))
    }

    fn remotes(&self) -> Vec<String> {
        self.with_repo(branches::load_remotes).unwrap_or_default()
    }

    fn commit_graph(&self) -> QueryResult<Vec<CommitGraphEntry>> {
        self.with_repo(history::load_graph)
    }

    fn stage_file(&self, file: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| status::stage_file(repo, file))
    }

    fn unstage_file(&self, file: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| status::unstage_file(repo, file))
    }

    fn stage_all(&self) -> QueryResult<CommandOutput> {
        self.with_repo(status::stage_all)
    }

    fn run_command(&self, line: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| command::run_git_line(repo.path(), line))
    }

    fn commit(&self, message: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| commit::commit_index(repo, message))
    }

    fn assisted_commit(&self) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| match self.assistant.split_first() {
            Some((program, args)) => command::run(repo.path(), program, args),
            None => Err(GitError::AssistantNotConfigured),
        })
    }

    fn create_branch(&self, name: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| branches::create_branch(repo, name))
    }

    fn switch_branch(&self, name: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| branches::switch_branch(repo, name))
    }

    fn push(&self, remote: &str, branch: Option<&str>) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| command::push(repo.path(), remote, branch))
    }

    fn pull(&self, remote: &str, branch: &str) -> QueryResult<CommandOutput> {
        self.with_repo(|repo| command::pull(repo.path(), remote, branch))
    }

    fn diff(&self, target: &DiffRef, source: &DiffRef) -> QueryResult<Vec<FileDiff>> {
        self.with_repo(|repo| diff::load_diff(repo, target, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryError;
    use crate::git::repository::tests::create_test_repo;
    use tempfile::TempDir;

    #[test]
    fn test_queries_without_repository() {
        let backend = Git2Backend::new();
        assert_eq!(backend.current_repository(), None);
        assert_eq!(backend.status(), Err(QueryError::NoRepository));
        assert_eq!(backend.history().unwrap_err().to_string(), "No repo selected");
        assert!(backend.remotes().is_empty());
    }

    #[test]
    fn test_set_repository() {
        let (temp_dir, _repo) = create_test_repo();
        let backend = Git2Backend::new();

        let selected = backend.set_repository(temp_dir.path()).unwrap();
        assert_eq!(selected, temp_dir.path());
        assert_eq!(backend.current_repository(), Some(temp_dir.path().to_path_buf()));
        assert_eq!(backend.status().unwrap(), StatusReport::default());
        assert_eq!(backend.history().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_repository_keeps_selection() {
        let (temp_dir, _repo) = create_test_repo();
        let plain = TempDir::new().unwrap();
        let backend = Git2Backend::new();
        backend.set_repository(temp_dir.path()).unwrap();

        let err = backend.set_repository(plain.path()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRepository(_)));
        assert_eq!(backend.current_repository(), Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_recent_repositories_most_recent_first() {
        let repos: Vec<(TempDir, Repository)> = (0..3).map(|_| create_test_repo()).collect();
        let backend = Git2Backend::new();

        for (dir, _) in &repos {
            backend.set_repository(dir.path()).unwrap();
        }
        backend.set_repository(repos[0].0.path()).unwrap();

        let recent = backend.recent_repositories();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0], repos[0].0.path());
        assert_eq!(recent[1], repos[2].0.path());
    }

    #[test]
    fn test_recent_list_is_capped() {
        let repos: Vec<(TempDir, Repository)> =
            (0..RECENT_LIMIT + 2).map(|_| create_test_repo()).collect();
        let backend = Git2Backend::new();
        for (dir, _) in &repos {
            backend.set_repository(dir.path()).unwrap();
        }
        assert_eq!(backend.recent_repositories().len(), RECENT_LIMIT);
    }

    #[test]
    fn test_history_limit() {
        let (temp_dir, _repo) = create_test_repo();
        let backend = Git2Backend::new().with_history_limit(0);
        backend.set_repository(temp_dir.path()).unwrap();
        assert!(backend.history().unwrap().is_empty());
    }

    #[test]
    fn test_assistant_not_configured() {
        let (temp_dir, _repo) = create_test_repo();
        let backend = Git2Backend::new().with_assistant("  ", Vec::new());
        backend.set_repository(temp_dir.path()).unwrap();

        let err = backend.assisted_commit().unwrap_err();
        assert_eq!(err.to_string(), "No assisted commit command configured");
    }

    #[test]
    fn test_diff_error_carries_detail() {
        let (temp_dir, _repo) = create_test_repo();
        let backend = Git2Backend::new();
        backend.set_repository(temp_dir.path()).unwrap();

        let err = backend
            .diff(&DiffRef::Branch("missing".into()), &DiffRef::Head)
            .unwrap_err();
        assert_eq!(err.to_string(), "Reference not found: missing");
        let detail = err.detail().unwrap();
        assert!(detail.contains("missing"));
        assert!(!detail.starts_with("fatal:"));
    }
}
