use super::error::{GitError, Result};
use super::repository::Repository;
use crate::api::{DiffLine, DiffRef, FileDiff};
use crate::model::classify_line;
use git2::{Diff as Git2Diff, DiffDelta, DiffFormat, DiffOptions, Tree};

/// Resolve a reference name to the tree of the commit it names.
fn resolve_tree<'r>(git_repo: &'r git2::Repository, reference: &DiffRef) -> Result<Tree<'r>> {
    let revspec = reference.as_str();
    git_repo
        .revparse_single(revspec)
        .and_then(|object| object.peel_to_tree())
        .map_err(|e| GitError::RefNotFound {
            name: revspec.to_string(),
            detail: e.message().to_string(),
        })
}

fn delta_path(delta: &DiffDelta) -> String {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Walk a git2 patch into per-file change lists.
///
/// Each line is rebuilt as `git diff` prints it and classified by its own
/// marker. File names come from the delta, not from the header text.
pub fn collect_files(diff: &Git2Diff) -> Result<Vec<FileDiff>> {
    let mut files: Vec<FileDiff> = Vec::new();

    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        match line.origin() {
            'F' => files.push(FileDiff::new(delta_path(&delta))),
            // End-of-file newline markers belong to neither side.
            '=' | '>' | '<' => {}
            origin => {
                let content = String::from_utf8_lossy(line.content());
                let content = content.trim_end_matches(['\n', '\r']);
                let raw = match origin {
                    '+' | '-' | ' ' => format!("{}{}", origin, content),
                    _ => content.to_string(),
                };
                if let (Some(kind), Some(file)) = (classify_line(&raw), files.last_mut()) {
                    file.changes.push(DiffLine::new(kind, raw));
                }
            }
        }
        true
    })?;

    Ok(files)
}

/// Changes between `target` and `source`.
///
/// A `WORKTREE` source compares the target with the working directory
/// (`git diff <target>`); any other source compares two commits
/// (`git diff <target> <source>`). Identical sides yield no files.
pub fn load_diff(repo: &Repository, target: &DiffRef, source: &DiffRef) -> Result<Vec<FileDiff>> {
    let git_repo = repo.open_git2()?;
    let target_tree = resolve_tree(&git_repo, target)?;

    let mut options = DiffOptions::new();
    options.context_lines(3);

    let diff = match source {
        DiffRef::WorkTree => {
            git_repo.diff_tree_to_workdir_with_index(Some(&target_tree), Some(&mut options))?
        }
        other => {
            let source_tree = resolve_tree(&git_repo, other)?;
            git_repo.diff_tree_to_tree(Some(&target_tree), Some(&source_tree), Some(&mut options))?
        }
    };

    collect_files(&diff)
}
