//! Request/response contract between the dashboard and a repository backend.

pub mod backend;
pub mod types;

pub use backend::{Backend, QueryError, QueryResult};
pub use types::{
    BranchSet, CommandOutput, CommitGraphEntry, CommitRecord, DiffLine, DiffRef, FileDiff,
    FileStatusEntry, GraphAuthor, LineKind, StatusReport, TreeNode,
};
