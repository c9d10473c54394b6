//! File access backend used by the file tools.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use react_core::ToolError;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("File '{0}' not found")]
    NotFound(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<SandboxError> for ToolError {
    fn from(error: SandboxError) -> Self {
        match error {
            SandboxError::NotFound(_) => ToolError::NotFound(error.to_string()),
            SandboxError::InvalidPath { .. } => ToolError::InvalidArguments(error.to_string()),
            SandboxError::Io { .. } => {
                ToolError::Execution(format!("Error reading file: {error}"))
            }
        }
    }
}

#[async_trait]
pub trait SandboxEnvironment: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<String, SandboxError>;
}

pub type SharedSandbox = Arc<dyn SandboxEnvironment>;

/// Sandbox backed by a directory on the local filesystem.
///
/// Relative paths resolve against the root; nothing outside the root is readable.
#[derive(Debug, Clone)]
pub struct LocalSandbox {
    root: PathBuf,
}

impl LocalSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> Result<PathBuf, SandboxError> {
        let requested = Path::new(path);

        if requested
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(SandboxError::InvalidPath {
                path: path.to_string(),
                reason: "contains '..'".to_string(),
            });
        }

        if requested.is_absolute() {
            if !requested.starts_with(&self.root) {
                return Err(SandboxError::InvalidPath {
                    path: path.to_string(),
                    reason: "outside of the sandbox".to_string(),
                });
            }
            return Ok(requested.to_path_buf());
        }

        Ok(self.root.join(requested))
    }
}

#[async_trait]
impl SandboxEnvironment for LocalSandbox {
    async fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        let resolved = self.resolve(path)?;

        fs::read_to_string(&resolved).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                SandboxError::NotFound(path.to_string())
            } else {
                SandboxError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}
