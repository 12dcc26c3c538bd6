//! Value types exchanged with a repository backend.
//!
//! Field names follow the wire protocol the dashboard speaks, so every type
//! here round-trips through `serde_json` unchanged. All values are snapshots:
//! a fresh fetch produces fresh values that replace the previous ones.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One staged or unstaged change as reported by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusEntry {
    /// Porcelain status code, e.g. `"M "`, `" M"`, `"??"`.
    pub status: String,
    /// Path relative to the repository root.
    pub file: String,
}

impl FileStatusEntry {
    pub fn new(status: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            file: file.into(),
        }
    }
}

/// Staged and unstaged changes of the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub staged: Vec<FileStatusEntry>,
    #[serde(default)]
    pub unstaged: Vec<FileStatusEntry>,
}

/// A commit as listed in the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    /// Display string, usually relative ("3 hours ago").
    pub time: String,
    pub message: String,
}

/// Local branches plus the checked-out one.
///
/// `current` is always either a member of `branches` or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BranchSetWire")]
pub struct BranchSet {
    pub branches: Vec<String>,
    pub current: Option<String>,
}

#[derive(Deserialize)]
struct BranchSetWire {
    #[serde(default)]
    branches: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    current: Option<String>,
}

impl From<BranchSetWire> for BranchSet {
    fn from(wire: BranchSetWire) -> Self {
        BranchSet::new(wire.branches, wire.current)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

impl BranchSet {
    /// Build a branch set, dropping a `current` name that is not listed.
    pub fn new(branches: Vec<String>, current: Option<String>) -> Self {
        let mut set = Self {
            branches,
            current: None,
        };
        let current = current.filter(|name| set.contains(name));
        set.current = current;
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b == name)
    }

    /// Index of the checked-out branch, if any.
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current.as_deref()?;
        self.branches.iter().position(|b| b == current)
    }
}

/// Classification of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Header,
    Add,
    Delete,
    Context,
}

/// A single line of a file diff, content kept verbatim (marker included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
}

impl DiffLine {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// All changes to one file, in hunk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub file: String,
    #[serde(default)]
    pub changes: Vec<DiffLine>,
}

impl FileDiff {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            changes: Vec::new(),
        }
    }

    pub fn additions(&self) -> usize {
        self.count(LineKind::Add)
    }

    pub fn deletions(&self) -> usize {
        self.count(LineKind::Delete)
    }

    /// Get a summary line for this file (e.g., "+10, -5")
    pub fn stats_summary(&self) -> String {
        format!("+{}, -{}", self.additions(), self.deletions())
    }

    fn count(&self, kind: LineKind) -> usize {
        self.changes.iter().filter(|l| l.kind == kind).count()
    }
}

/// A node of the repository file tree.
///
/// Only directories carry children; a file has no `children` field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File {
        name: String,
    },
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<TreeNode>,
    },
}

/// Author block of a graph entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAuthor {
    pub name: String,
    pub email: String,
}

/// A commit with its ancestry and decorations, input to lineage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGraphEntry {
    pub hash: String,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Decorations as git prints them: `HEAD -> main`, `origin/main`, `tag: v1`.
    #[serde(default)]
    pub refs: Vec<String>,
    #[serde(default)]
    pub author: GraphAuthor,
    pub subject: String,
}

/// Captured output of a mutating command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl CommandOutput {
    /// Plain acknowledgement with no output.
    pub fn ack() -> Self {
        Self::default()
    }

    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            stderr: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// One side of a diff request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiffRef {
    /// The checked-out commit (`HEAD`).
    Head,
    /// Uncommitted changes on disk (`WORKTREE`).
    WorkTree,
    /// Any other revision name, usually a branch.
    Branch(String),
}

impl DiffRef {
    pub const HEAD: &'static str = "HEAD";
    pub const WORKTREE: &'static str = "WORKTREE";

    pub fn parse(name: &str) -> Self {
        match name {
            Self::HEAD => DiffRef::Head,
            Self::WORKTREE => DiffRef::WorkTree,
            other => DiffRef::Branch(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DiffRef::Head => Self::HEAD,
            DiffRef::WorkTree => Self::WORKTREE,
            DiffRef::Branch(name) => name,
        }
    }
}

impl From<String> for DiffRef {
    fn from(value: String) -> Self {
        DiffRef::parse(&value)
    }
}

impl From<DiffRef> for String {
    fn from(value: DiffRef) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DiffRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_report_from_json() {
        let json = r#"{"staged":[{"status":"M ","file":"a.txt"}],"unstaged":[]}"#;
        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.staged, vec![FileStatusEntry::new("M ", "a.txt")]);
        assert!(report.unstaged.is_empty());
    }

    #[test]
    fn test_branch_set_empty_current_is_none() {
        let json = r#"{"branches":["main","dev"],"current":""}"#;
        let set: BranchSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.current, None);
        assert_eq!(set.current_index(), None);
    }

    #[test]
    fn test_branch_set_drops_unknown_current() {
        let set = BranchSet::new(vec!["main".into()], Some("gone".into()));
        assert_eq!(set.current, None);

        let set = BranchSet::new(vec!["dev".into(), "main".into()], Some("main".into()));
        assert_eq!(set.current_index(), Some(1));
    }

    #[test]
    fn test_diff_line_wire_names() {
        let line = DiffLine::new(LineKind::Delete, "-old");
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"type":"delete","content":"-old"}"#);
    }

    #[test]
    fn test_tree_node_file_has_no_children() {
        let json = r#"{"name":"root","type":"directory","children":[
            {"name":"a.txt","type":"file"},
            {"name":"src","type":"directory","children":[{"name":"b.txt","type":"file"}]}
        ]}"#;
        let tree: TreeNode = serde_json::from_str(json).unwrap();
        let TreeNode::Directory { children, .. } = &tree else {
            panic!("root should be a directory");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(
            serde_json::to_string(&children[0]).unwrap(),
            r#"{"type":"file","name":"a.txt"}"#
        );
    }

    #[test]
    fn test_diff_ref_symbolic_names() {
        assert_eq!(DiffRef::parse("HEAD"), DiffRef::Head);
        assert_eq!(DiffRef::parse("WORKTREE"), DiffRef::WorkTree);
        assert_eq!(DiffRef::parse("main"), DiffRef::Branch("main".into()));
        assert_eq!(serde_json::to_string(&DiffRef::WorkTree).unwrap(), r#""WORKTREE""#);
    }

    #[test]
    fn test_file_diff_stats() {
        let mut diff = FileDiff::new("a.txt");
        diff.changes.push(DiffLine::new(LineKind::Header, "@@ -1 +1 @@"));
        diff.changes.push(DiffLine::new(LineKind::Delete, "-a"));
        diff.changes.push(DiffLine::new(LineKind::Add, "+b"));
        diff.changes.push(DiffLine::new(LineKind::Add, "+c"));
        assert_eq!(diff.stats_summary(), "+2, -1");
    }

    #[test]
    fn test_graph_entry_defaults() {
        let json = r#"{"hash":"abc","subject":"init"}"#;
        let entry: CommitGraphEntry = serde_json::from_str(json).unwrap();
        assert!(entry.parents.is_empty());
        assert!(entry.refs.is_empty());
    }
}
