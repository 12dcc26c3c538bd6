//! Turning raw unified-diff text into classified, per-file change sets.

use crate::api::{Backend, DiffLine, DiffRef, FileDiff, LineKind, QueryError, QueryResult};

/// What a single raw line of unified diff output means on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine<'a> {
    /// `diff --git a/x b/x`: starts the changes of a new file.
    FileStart(&'a str),
    /// A renderable line of the current file.
    Change(LineKind),
    /// Metadata such as `index ...`, `--- a/x`, `+++ b/x`, `\ No newline`.
    Meta,
}

/// Classify one raw line by its leading marker only.
///
/// The result never depends on surrounding lines, so any reordering of a
/// payload leaves each line's classification unchanged.
pub fn classify(line: &str) -> RawLine<'_> {
    if let Some(rest) = line.strip_prefix("diff --git ") {
        RawLine::FileStart(file_name(rest))
    } else if line.starts_with("@@") {
        RawLine::Change(LineKind::Header)
    } else if line.starts_with('+') && !line.starts_with("+++") {
        RawLine::Change(LineKind::Add)
    } else if line.starts_with('-') && !line.starts_with("---") {
        RawLine::Change(LineKind::Delete)
    } else if line.is_empty() || line.starts_with(' ') {
        RawLine::Change(LineKind::Context)
    } else {
        RawLine::Meta
    }
}

/// Convenience wrapper returning only the line kind of a change line.
pub fn classify_line(line: &str) -> Option<LineKind> {
    match classify(line) {
        RawLine::Change(kind) => Some(kind),
        _ => None,
    }
}

/// Extract the new-side path from the operands of a `diff --git` line.
///
/// Without a rename both sides name the same path, so `a/P b/P` splits
/// exactly in the middle even when `P` itself contains ` b/`.
fn file_name(operands: &str) -> &str {
    if let Some(rest) = operands.strip_prefix("a/") {
        if rest.len() >= 3 && (rest.len() - 3) % 2 == 0 {
            let half = (rest.len() - 3) / 2;
            if rest.is_char_boundary(half) && rest.is_char_boundary(half + 3) {
                let (old, new) = (&rest[..half], &rest[half..]);
                if let Some(new) = new.strip_prefix(" b/") {
                    if old == new {
                        return new;
                    }
                }
            }
        }
    }
    if let Some((_, new_path)) = operands.rsplit_once(" b/") {
        return new_path;
    }
    let last = operands.rsplit(' ').next().unwrap_or(operands);
    last.strip_prefix("b/").unwrap_or(last)
}

/// Group a unified diff into files, keeping file order and line order exactly
/// as received. Lines before the first file header are dropped.
pub fn parse_unified_diff(text: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();

    for line in text.lines() {
        match classify(line) {
            RawLine::FileStart(name) => files.push(FileDiff::new(name)),
            RawLine::Change(kind) => {
                if let Some(file) = files.last_mut() {
                    file.changes.push(DiffLine::new(kind, line));
                }
            }
            RawLine::Meta => {}
        }
    }

    files
}

/// Result of a diff request as the diff modal shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Valid, empty result: nothing differs between the two references.
    NoChanges,
    Changes(Vec<FileDiff>),
    Failed {
        message: String,
        detail: Option<String>,
    },
}

impl DiffOutcome {
    pub fn from_response(response: QueryResult<Vec<FileDiff>>) -> Self {
        match response {
            Ok(files) if files.is_empty() => DiffOutcome::NoChanges,
            Ok(files) => DiffOutcome::Changes(files),
            Err(err) => {
                let detail = err.detail().map(str::to_string);
                DiffOutcome::Failed {
                    message: err.to_string(),
                    detail,
                }
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiffOutcome::Failed { .. })
    }

    /// Total (additions, deletions) across all files.
    pub fn total_stats(&self) -> (usize, usize) {
        match self {
            DiffOutcome::Changes(files) => (
                files.iter().map(FileDiff::additions).sum(),
                files.iter().map(FileDiff::deletions).sum(),
            ),
            _ => (0, 0),
        }
    }
}

/// Ask the backend for the changes between `target` and `source`.
///
/// Always issues the request, even when both sides are equal: symbolic
/// references are only resolved by the backend.
pub fn compute_diff(backend: &dyn Backend, target: &DiffRef, source: &DiffRef) -> DiffOutcome {
    DiffOutcome::from_response(backend.diff(target, source))
}

impl From<QueryError> for DiffOutcome {
    fn from(err: QueryError) -> Self {
        DiffOutcome::from_response(Err(err))
    }
}
