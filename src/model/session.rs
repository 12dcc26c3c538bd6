use crate::api::{QueryError, QueryResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque name of the selected repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryHandle(PathBuf);

impl RepositoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The one repository the dashboard is working on.
///
/// Every change of handle bumps the generation; data tagged with an older
/// generation belongs to a previous repository and must be discarded.
#[derive(Debug, Default)]
pub struct RepositorySession {
    handle: Option<RepositoryHandle>,
    generation: u64,
}

impl RepositorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&RepositoryHandle> {
        self.handle.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the backend's answer to a selection request.
    ///
    /// A failure leaves the current handle untouched.
    pub fn select(&mut self, outcome: QueryResult<PathBuf>) -> Result<&RepositoryHandle, QueryError> {
        let path = outcome?;
        Ok(self.replace(path))
    }

    /// Adopt a repository the backend remembered from an earlier session.
    pub fn restore(&mut self, remembered: Option<PathBuf>) -> Option<&RepositoryHandle> {
        let path = remembered?;
        Some(self.replace(path))
    }

    /// Drop the selection entirely.
    pub fn clear(&mut self) {
        if self.handle.take().is_some() {
            self.generation += 1;
        }
    }

    fn replace(&mut self, path: PathBuf) -> &RepositoryHandle {
        self.generation += 1;
        self.handle.insert(RepositoryHandle::new(path))
    }
}
