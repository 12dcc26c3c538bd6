use super::error::{GitError, Result};
use super::repository::Repository;
use crate::api::CommandOutput;

/// Commit the index on HEAD with `message`, using the repository signature.
///
/// Fails with `NothingToCommit` when the index matches HEAD.
pub fn commit_index(repo: &Repository, message: &str) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;
    let signature = git_repo.signature()?;

    let mut index = git_repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = git_repo.find_tree(tree_id)?;

    let parent = match git_repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = &parent {
        if parent.tree_id() == tree_id {
            return Err(GitError::NothingToCommit);
        }
    } else if index.is_empty() {
        return Err(GitError::NothingToCommit);
    }

    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let oid = git_repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

    let branch = repo.current_branch()?.unwrap_or_else(|| "detached HEAD".to_string());
    let summary = message.lines().next().unwrap_or_default();
    let mut short = oid.to_string();
    short.truncate(7);

    Ok(CommandOutput::stdout(format!("[{} {}] {}\n", branch, short, summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::repository::tests::{create_test_repo, write_and_add};

    fn configure_identity(repo: &Repository) {
        let git_repo = repo.open_git2().unwrap();
        let mut config = git_repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    #[test]
    fn test_commit_staged_changes() {
        let (_temp_dir, repo) = create_test_repo();
        configure_identity(&repo);
        let git_repo = repo.open_git2().unwrap();
        write_and_add(&git_repo, "new.txt", "new\n");

        let output = commit_index(&repo, "Add new file").unwrap();
        assert!(output.stdout.ends_with("] Add new file\n"));
        assert!(output.stderr.is_empty());

        let head = git_repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.summary(), Some("Add new file"));
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn test_commit_without_changes() {
        let (_temp_dir, repo) = create_test_repo();
        configure_identity(&repo);

        let result = commit_index(&repo, "Nothing here");
        assert!(matches!(result, Err(GitError::NothingToCommit)));
    }
}
