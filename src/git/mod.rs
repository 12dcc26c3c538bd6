// Git operations backing the dashboard

pub mod backend;
pub mod branches;
pub mod command;
pub mod commit;
pub mod diff;
pub mod error;
pub mod history;
pub mod repository;
pub mod status;
pub mod tree;

pub use backend::Git2Backend;
pub use error::{GitError, Result};
pub use repository::Repository;
