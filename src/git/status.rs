use super::error::Result;
use super::repository::Repository;
use crate::api::{CommandOutput, FileStatusEntry, StatusReport};
use git2::{IndexAddOption, Status as Git2Status, StatusOptions};
use std::path::Path;

/// Index-side codes that put an entry in the staged list.
const STAGED_CODES: [char; 5] = ['M', 'A', 'D', 'R', 'C'];

/// Two-character porcelain code (`XY`) for a set of git2 status flags.
pub fn porcelain_code(flags: Git2Status) -> String {
    if flags.is_conflicted() {
        return "UU".to_string();
    }
    if flags.is_wt_new() && !index_changed(flags) {
        return "??".to_string();
    }

    let index = if flags.is_index_new() {
        'A'
    } else if flags.is_index_modified() {
        'M'
    } else if flags.is_index_deleted() {
        'D'
    } else if flags.is_index_renamed() {
        'R'
    } else if flags.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if flags.is_wt_modified() {
        'M'
    } else if flags.is_wt_deleted() {
        'D'
    } else if flags.is_wt_renamed() {
        'R'
    } else if flags.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    format!("{}{}", index, worktree)
}

fn index_changed(flags: Git2Status) -> bool {
    flags.intersects(
        Git2Status::INDEX_NEW
            | Git2Status::INDEX_MODIFIED
            | Git2Status::INDEX_DELETED
            | Git2Status::INDEX_RENAMED
            | Git2Status::INDEX_TYPECHANGE,
    )
}

/// Check if a porcelain code belongs in the staged list
pub fn is_staged_code(code: &str) -> bool {
    code.chars()
        .next()
        .is_some_and(|c| STAGED_CODES.contains(&c))
}

/// Load the staged/unstaged split of the working tree.
///
/// Each path appears once: in the staged list when its index side changed,
/// otherwise in the unstaged list.
pub fn load_status(repo: &Repository) -> Result<StatusReport> {
    let git_repo = repo.open_git2()?;
    let mut report = StatusReport::default();

    let mut opts = StatusOptions::new();
    opts.include_untracked(true);
    opts.recurse_untracked_dirs(true);
    opts.exclude_submodules(true);
    opts.renames_head_to_index(true);

    let statuses = git_repo.statuses(Some(&mut opts))?;

    for entry in statuses.iter() {
        let flags = entry.status();
        if flags.is_ignored() || flags.is_empty() {
            continue;
        }

        let path = entry.path().unwrap_or("<unknown>").to_string();
        let code = porcelain_code(flags);

        if is_staged_code(&code) {
            report.staged.push(FileStatusEntry::new(code, path));
        } else {
            report.unstaged.push(FileStatusEntry::new(code, path));
        }
    }

    Ok(report)
}

/// Stage a file (add to index, or record its deletion)
pub fn stage_file(repo: &Repository, path: &str) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;
    let mut index = git_repo.index()?;

    if repo.workdir().join(path).exists() {
        index.add_path(Path::new(path))?;
    } else {
        index.remove_path(Path::new(path))?;
    }
    index.write()?;

    Ok(CommandOutput::ack())
}

/// Stage every change in the working tree, untracked files included.
pub fn stage_all(repo: &Repository) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;
    let mut index = git_repo.index()?;

    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;

    Ok(CommandOutput::ack())
}

/// Unstage a file (reset its index entry to HEAD)
pub fn unstage_file(repo: &Repository, path: &str) -> Result<CommandOutput> {
    let git_repo = repo.open_git2()?;

    match git_repo.head().and_then(|head| head.peel_to_commit()) {
        Ok(head_commit) => {
            git_repo.reset_default(Some(head_commit.as_object()), [path])?;
        }
        Err(_) => {
            // No commits yet: unstaging means dropping the entry.
            let mut index = git_repo.index()?;
            index.remove_path(Path::new(path))?;
            index.write()?;
        }
    }

    Ok(CommandOutput::ack())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::repository::tests::{commit_index, write_and_add};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo_with_changes() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path();
        let git_repo = git2::Repository::init(repo_path).unwrap();

        write_and_add(&git_repo, "existing.txt", "existing content\n");
        commit_index(&git_repo, "Initial");

        // Staged change
        write_and_add(&git_repo, "staged.txt", "staged content\n");
        // Unstaged modification
        fs::write(repo_path.join("existing.txt"), "modified content\n").unwrap();
        // Untracked file
        fs::write(repo_path.join("untracked.txt"), "untracked content\n").unwrap();

        let repo = Repository::open(repo_path).unwrap();
        (temp_dir, repo)
    }

    fn files(entries: &[FileStatusEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.file.as_str()).collect()
    }

    #[test]
    fn test_load_status() {
        let (_temp_dir, repo) = create_test_repo_with_changes();
        let report = load_status(&repo).unwrap();

        assert_eq!(report.staged, vec![FileStatusEntry::new("A ", "staged.txt")]);
        assert_eq!(files(&report.unstaged), vec!["existing.txt", "untracked.txt"]);
        assert_eq!(report.unstaged[0].status, " M");
        assert_eq!(report.unstaged[1].status, "??");
    }

    #[test]
    fn test_stage_and_unstage_round_trip() {
        let (_temp_dir, repo) = create_test_repo_with_changes();

        stage_file(&repo, "untracked.txt").unwrap();
        let report = load_status(&repo).unwrap();
        assert!(files(&report.staged).contains(&"untracked.txt"));
        assert!(!files(&report.unstaged).contains(&"untracked.txt"));

        unstage_file(&repo, "untracked.txt").unwrap();
        let report = load_status(&repo).unwrap();
        assert!(files(&report.unstaged).contains(&"untracked.txt"));
        assert!(!files(&report.staged).contains(&"untracked.txt"));
    }

    #[test]
    fn test_stage_deleted_file() {
        let (temp_dir, repo) = create_test_repo_with_changes();
        fs::remove_file(temp_dir.path().join("existing.txt")).unwrap();

        stage_file(&repo, "existing.txt").unwrap();
        let report = load_status(&repo).unwrap();
        assert!(report.staged.contains(&FileStatusEntry::new("D ", "existing.txt")));
    }

    #[test]
    fn test_stage_all() {
        let (_temp_dir, repo) = create_test_repo_with_changes();
        stage_all(&repo).unwrap();

        let report = load_status(&repo).unwrap();
        assert!(report.unstaged.is_empty());
        assert_eq!(report.staged.len(), 3);
    }

    #[test]
    fn test_porcelain_codes() {
        assert_eq!(porcelain_code(Git2Status::WT_NEW), "??");
        assert_eq!(porcelain_code(Git2Status::INDEX_MODIFIED), "M ");
        assert_eq!(
            porcelain_code(Git2Status::INDEX_MODIFIED | Git2Status::WT_MODIFIED),
            "MM"
        );
        assert_eq!(porcelain_code(Git2Status::WT_DELETED), " D");
        assert_eq!(porcelain_code(Git2Status::CONFLICTED), "UU");
    }

    #[test]
    fn test_staged_codes() {
        assert!(is_staged_code("M "));
        assert!(is_staged_code("AM"));
        assert!(!is_staged_code(" M"));
        assert!(!is_staged_code("??"));
        assert!(!is_staged_code("UU"));
        assert!(!is_staged_code(""));
    }
}
