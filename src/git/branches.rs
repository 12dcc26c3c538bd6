use super::error::{GitError, Result};
use super::repository::Repository;
use crate::api::{BranchSet, CommandOutput};
use git2::{build::CheckoutBuilder, BranchType};

/// List local branches in name order with the checked-out one.
pub fn load_branches(repo: &Repository) -> Result<BranchSet> {
    let git_repo = repo.open_git2()?;

    let mut branches = Vec::new();
    for branch in git_repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            branches.push(name.to_string());
        }
    }
    branches.sort();

    Ok(BranchSet::new(branches, repo.current_branch()?))
}

/// Names of the configured remotes.
pub fn load_remotes(repo: &Repository) -> Result<Vec<String>> {
    let git_repo = repo.open_git2()?;
    let remotes = git_repo.remotes()?;
    Ok(remotes.iter().flatten().map(str::to_string).collect())
}

/// Create a branch at HEAD and check it out.
pub fn create_branch(repo: &Repository, name: &str) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;
    let head = git_repo.head()?.peel_to_commit()?;
    git_repo.branch(name, &head, false)?;

    checkout(&git_repo, name)?;
    Ok(CommandOutput::stdout(format!("Switched to a new branch '{}'\n", name)))
}

/// Check out an existing local branch.
pub fn switch_branch(repo: &Repository, name: &str) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;
    checkout(&git_repo, name)?;
    Ok(CommandOutput::stdout(format!("Switched to branch '{}'\n", name)))
}

fn checkout(git_repo: &git2::Repository, name: &str) -> Result<()> {
    let branch = git_repo
        .find_branch(name, BranchType::Local)
        .map_err(|e| GitError::RefNotFound {
            name: name.to_string(),
            detail: e.message().to_string(),
        })?;
    let refname = branch
        .get()
        .name()
        .ok_or_else(|| GitError::RefNotFound {
            name: name.to_string(),
            detail: "branch name is not valid UTF-8".to_string(),
        })?
        .to_string();
    let target = branch.get().peel_to_commit()?;

    git_repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;
    git_repo.set_head(&refname)?;
    Ok(())
}
