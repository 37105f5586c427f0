use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Build output and tooling directories that are never rewritten.
pub const DEFAULT_FORBIDDEN_DIRS: &[&str] = &["bin", "obj", ".git", ".vs"];

/// Keeps fixes inside the workspace and out of generated directories.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical workspace root
    workspace_root: PathBuf,
    /// Directory names that may not appear below the root
    forbidden_dirs: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is in forbidden directory `{dir}`: {path}")]
    ForbiddenPath { path: PathBuf, dir: String },

    #[error("failed to canonicalize {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn canonicalize(path: &Path) -> Result<PathBuf, SafetyError> {
    path.canonicalize()
        .map_err(|source| SafetyError::Canonicalize {
            path: path.to_path_buf(),
            source,
        })
}

impl WorkspaceGuard {
    /// Guard `workspace_root` with the default forbidden directories.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Self::with_forbidden_dirs(
            workspace_root,
            DEFAULT_FORBIDDEN_DIRS.iter().map(|dir| dir.to_string()),
        )
    }

    pub fn with_forbidden_dirs(
        workspace_root: impl AsRef<Path>,
        forbidden_dirs: impl IntoIterator<Item = String>,
    ) -> Result<Self, SafetyError> {
        Ok(Self {
            workspace_root: canonicalize(workspace_root.as_ref())?,
            forbidden_dirs: forbidden_dirs.into_iter().collect(),
        })
    }

    /// Check if a path is safe to edit.
    ///
    /// Relative paths are resolved against the workspace root. Returns the
    /// canonical path.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };
        let canonical = canonicalize(&absolute)?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        let relative = canonical
            .strip_prefix(&self.workspace_root)
            .map_err(|_| SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            })?;

        // The file name itself is not a directory.
        let dirs = relative.parent().map(Path::components).into_iter().flatten();
        for component in dirs {
            if let Component::Normal(name) = component {
                if let Some(dir) = self
                    .forbidden_dirs
                    .iter()
                    .find(|dir| name.to_str() == Some(dir.as_str()))
                {
                    return Err(SafetyError::ForbiddenPath {
                        path: canonical.to_path_buf(),
                        dir: dir.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
