use super::error::Result;
use super::repository::Repository;
use crate::api::{CommitGraphEntry, CommitRecord, GraphAuthor};
use chrono::{DateTime, Local};
use git2::{Oid, Sort, Time};
use std::collections::HashMap;

const SHORT_HASH_LEN: usize = 7;

/// Convert git2::Time to chrono::DateTime
fn time_to_datetime(time: Time) -> DateTime<Local> {
    DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Format a commit time relative to `now` (e.g., "2 hours ago")
pub fn relative_date(date: DateTime<Local>, now: DateTime<Local>) -> String {
    let duration = now.signed_duration_since(date);

    let format_unit = |count: i64, unit: &str| {
        format!("{} {}{} ago", count, unit, if count == 1 { "" } else { "s" })
    };

    if duration.num_seconds() < 60 {
        return "just now".to_string();
    }
    if duration.num_minutes() < 60 {
        return format_unit(duration.num_minutes(), "minute");
    }
    if duration.num_hours() < 24 {
        return format_unit(duration.num_hours(), "hour");
    }
    if duration.num_days() < 7 {
        return format_unit(duration.num_days(), "day");
    }
    if duration.num_weeks() < 4 {
        return format_unit(duration.num_weeks(), "week");
    }
    if duration.num_days() < 365 {
        return format_unit(duration.num_days() / 30, "month");
    }

    format_unit(duration.num_days() / 365, "year")
}

fn short_hash(oid: Oid) -> String {
    let mut hash = oid.to_string();
    hash.truncate(SHORT_HASH_LEN);
    hash
}

/// Load up to `limit` commits reachable from HEAD, newest first.
///
/// A repository without commits has an empty history.
pub fn load_history(repo: &Repository, limit: usize) -> Result<Vec<CommitRecord>> {
    let git_repo = repo.open_git2()?;
    if git_repo.head().is_err() {
        return Ok(Vec::new());
    }

    let mut revwalk = git_repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
    revwalk.push_head()?;

    let now = Local::now();
    let mut commits = Vec::with_capacity(limit);

    for oid in revwalk.take(limit) {
        let commit = git_repo.find_commit(oid?)?;
        let author = commit.author();

        commits.push(CommitRecord {
            hash: short_hash(commit.id()),
            author: String::from_utf8_lossy(author.name_bytes()).to_string(),
            time: relative_date(time_to_datetime(author.when()), now),
            message: String::from_utf8_lossy(commit.summary_bytes().unwrap_or_default())
                .to_string(),
        });
    }

    Ok(commits)
}

/// Map each commit to the decorations pointing at it, HEAD first.
fn collect_decorations(git_repo: &git2::Repository) -> Result<HashMap<Oid, Vec<String>>> {
    let mut decorations: HashMap<Oid, Vec<String>> = HashMap::new();

    let head_branch = match git_repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().map(str::to_string),
        Ok(head) => {
            if let Some(target) = head.target() {
                decorations.entry(target).or_default().push("HEAD".to_string());
            }
            None
        }
        Err(_) => None,
    };

    for reference in git_repo.references()?.flatten() {
        let Some(name) = reference.shorthand().map(str::to_string) else {
            continue;
        };
        let Ok(commit) = reference.peel_to_commit() else {
            continue;
        };

        let label = if reference.is_tag() {
            format!("tag: {}", name)
        } else if reference.is_branch() && head_branch.as_deref() == Some(name.as_str()) {
            format!("HEAD -> {}", name)
        } else if reference.is_branch() || reference.is_remote() {
            name
        } else {
            continue;
        };

        let labels = decorations.entry(commit.id()).or_default();
        if label.starts_with("HEAD") {
            labels.insert(0, label);
        } else {
            labels.push(label);
        }
    }

    Ok(decorations)
}

/// Load every commit reachable from any branch, tag or HEAD, newest first,
/// with full hashes, parents and decorations.
pub fn load_graph(repo: &Repository) -> Result<Vec<CommitGraphEntry>> {
    let git_repo = repo.open_git2()?;
    let decorations = collect_decorations(&git_repo)?;

    let mut revwalk = git_repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
    if git_repo.head().is_ok() {
        revwalk.push_head()?;
    }
    revwalk.push_glob("refs/heads/*")?;
    revwalk.push_glob("refs/remotes/*")?;
    revwalk.push_glob("refs/tags/*")?;

    let mut entries = Vec::new();
    for oid in revwalk {
        let oid = oid?;
        let commit = git_repo.find_commit(oid)?;
        let author = commit.author();

        entries.push(CommitGraphEntry {
            hash: oid.to_string(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            refs: decorations.get(&oid).cloned().unwrap_or_default(),
            author: GraphAuthor {
                name: String::from_utf8_lossy(author.name_bytes()).to_string(),
                email: String::from_utf8_lossy(author.email_bytes()).to_string(),
            },
            subject: String::from_utf8_lossy(commit.summary_bytes().unwrap_or_default())
                .to_string(),
        });
    }

    Ok(entries)
}
