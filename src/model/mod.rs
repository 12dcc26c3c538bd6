// Pure transforms over fetched repository snapshots

pub mod diff;
pub mod graph;
pub mod session;
pub mod tree;

pub use diff::{classify_line, compute_diff, parse_unified_diff, DiffOutcome};
pub use graph::{Connector, ConnectorKind, GraphNode, LineageGraph};
pub use session::{RepositoryHandle, RepositorySession};
pub use tree::{visible_rows, TreeRow};
