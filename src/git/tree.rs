use super::error::Result;
use crate::api::TreeNode;
use std::fs;
use std::io;
use std::path::Path;

/// Directory names never shown in the tree.
const SKIPPED_DIRS: [&str; 4] = ["__pycache__", "node_modules", "venv", "env"];

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

/// Walk `root` into a directory tree.
///
/// Hidden entries and dependency/cache folders are skipped. Within a directory,
/// subdirectories come first, then files, each in case-insensitive name order.
/// Symbolic links are listed as files and never followed.
pub fn load_tree(root: &Path) -> Result<TreeNode> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    Ok(TreeNode::directory(name, read_children(root)?))
}

fn read_children(dir: &Path) -> Result<Vec<TreeNode>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // Unreadable subdirectories show up empty.
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut listed = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden(&name) {
            continue;
        }
        let is_dir = entry.file_type()?.is_dir();
        listed.push((is_dir, name, entry.path()));
    }

    listed.sort_by(|(a_dir, a_name, _), (b_dir, b_name, _)| {
        b_dir
            .cmp(a_dir)
            .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
    });

    listed
        .into_iter()
        .map(|(is_dir, name, path)| {
            if is_dir {
                Ok(TreeNode::directory(name, read_children(&path)?))
            } else {
                Ok(TreeNode::file(name))
            }
        })
        .collect()
}
