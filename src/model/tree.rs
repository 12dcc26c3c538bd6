use crate::api::TreeNode;
use std::collections::HashSet;

impl TreeNode {
    pub fn file(name: impl Into<String>) -> Self {
        TreeNode::File { name: name.into() }
    }

    pub fn directory(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name } | TreeNode::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// Children of a directory; always empty for a file.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File { .. } => &[],
            TreeNode::Directory { children, .. } => children,
        }
    }

    /// Number of file nodes below this one (itself included when a file).
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Directory { children, .. } => children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

/// One visible line of the tree panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    /// Slash-joined path from the root's children, used as the expansion key.
    pub path: String,
    pub is_directory: bool,
    pub expanded: bool,
}

/// Flatten the root's children into rows, descending only into expanded
/// directories. The root itself is not shown.
pub fn visible_rows(root: &TreeNode, expanded: &HashSet<String>) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    for child in root.children() {
        push_rows(child, "", 0, expanded, &mut rows);
    }
    rows
}

fn push_rows(
    node: &TreeNode,
    parent: &str,
    depth: usize,
    expanded: &HashSet<String>,
    rows: &mut Vec<TreeRow>,
) {
    let path = if parent.is_empty() {
        node.name().to_string()
    } else {
        format!("{}/{}", parent, node.name())
    };
    let is_open = node.is_directory() && expanded.contains(&path);

    rows.push(TreeRow {
        depth,
        name: node.name().to_string(),
        path: path.clone(),
        is_directory: node.is_directory(),
        expanded: is_open,
    });

    if is_open {
        for child in node.children() {
            push_rows(child, &path, depth + 1, expanded, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::directory(
            "repo",
            vec![
                TreeNode::directory("src", vec![TreeNode::file("b.txt")]),
                TreeNode::file("a.txt"),
            ],
        )
    }

    #[test]
    fn test_file_children_always_empty() {
        let file = TreeNode::file("a.txt");
        assert!(file.children().is_empty());
        assert!(!file.is_directory());
    }

    #[test]
    fn test_collapsed_rows() {
        let rows = visible_rows(&sample(), &HashSet::new());
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["src", "a.txt"]);
        assert!(rows[0].is_directory);
        assert!(!rows[0].expanded);
    }

    #[test]
    fn test_expanded_rows() {
        let expanded: HashSet<String> = ["src".to_string()].into_iter().collect();
        let rows = visible_rows(&sample(), &expanded);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].path, "src/b.txt");
        assert_eq!(rows[1].depth, 1);
        assert!(rows[0].expanded);
    }

    #[test]
    fn test_file_count() {
        assert_eq!(sample().file_count(), 2);
    }
}
