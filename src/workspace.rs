//! File-level driver: discover sources, analyze them in parallel, plan and
//! write fixes.

use crate::config::Config;
use crate::detector::Detector;
use crate::diagnostic::Diagnostic;
use crate::edit::{Edit, EditError, EditResult};
use crate::fix_all::fix_all;
use crate::formatter::format_annotated;
use crate::rewriter::RewriteError;
use crate::safety::{SafetyError, WorkspaceGuard};
use crate::semantic::DeclarationOracle;
use crate::syntax::{LineColumn, LineIndex, SyntaxError, SyntaxTree};
use crate::validate::{validate_edit, ValidationError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("{path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// One analyzed source file.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub tree: SyntaxTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// One code action applied by a plan, located in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixAction {
    pub title: &'static str,
    pub start: LineColumn,
}

/// The fixed text of one file, validated but not yet written.
#[derive(Debug, Clone)]
pub struct FilePlan {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
    pub actions: Vec<FixAction>,
    pub conflicts: usize,
}

impl FilePlan {
    /// Number of statements rewritten.
    pub fn fixed(&self) -> usize {
        self.actions.len()
    }

    pub fn to_edit(&self) -> Edit {
        Edit::replace_file(&self.path, &self.before, self.after.clone())
    }
}

/// Source files and settings of one run.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Source files under `paths`, sorted. Files named explicitly are taken
    /// as they are; directories are walked, skipping excluded directories.
    pub fn discover(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_file() {
                files.push(path.clone());
                continue;
            }

            let mut it = WalkDir::new(path).into_iter();
            while let Some(entry) = it.next() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!(%err, "skipping unreadable entry");
                        continue;
                    }
                };
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_dir() {
                    if entry.depth() > 0 && self.config.files.exclude.iter().any(|dir| *dir == name) {
                        it.skip_current_dir();
                    }
                    continue;
                }
                let is_source = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.config.is_source_extension(ext));
                if is_source {
                    files.push(entry.into_path());
                }
            }
        }
        files.sort();
        files.dedup();
        debug!(count = files.len(), "discovered source files");
        files
    }

    /// Parse and check one file.
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis, WorkspaceError> {
        let tree = SyntaxTree::parse_file(path)?;
        let diagnostics = if self.config.rule.enabled {
            Detector::default()
                .with_severity(self.config.rule.severity)
                .detect(&tree, &DeclarationOracle)
                .collect()
        } else {
            Vec::new()
        };
        if tree.has_errors() {
            debug!(path = %path.display(), "file has syntax errors");
        }
        Ok(FileAnalysis {
            path: path.to_path_buf(),
            tree,
            diagnostics,
        })
    }

    /// Analyze every file in parallel; results keep the order of `files`.
    pub fn analyze(&self, files: &[PathBuf]) -> Vec<Result<FileAnalysis, WorkspaceError>> {
        files
            .par_iter()
            .map(|path| self.analyze_file(path))
            .collect()
    }

    /// Apply every fix of an analyzed file in memory.
    ///
    /// `None` when the file has nothing to fix.
    pub fn plan(&self, analysis: &FileAnalysis) -> Result<Option<FilePlan>, WorkspaceError> {
        if analysis.diagnostics.is_empty() {
            return Ok(None);
        }
        let outcome =
            fix_all(&analysis.tree, &analysis.diagnostics).map_err(|source| WorkspaceError::Rewrite {
                path: analysis.path.clone(),
                source,
            })?;
        let tree = if self.config.fix.format {
            format_annotated(&outcome.tree)
        } else {
            outcome.tree.clone()
        };

        let before = analysis.tree.to_source();
        let after = tree.to_source();
        validate_edit(&before, &after).map_err(|source| WorkspaceError::Validation {
            path: analysis.path.clone(),
            source,
        })?;

        let lines = LineIndex::new(before.as_str());
        let actions = outcome
            .applied
            .iter()
            .map(|fix| FixAction {
                title: fix.title(),
                start: lines.line_col(fix.range().start),
            })
            .collect();

        Ok(Some(FilePlan {
            path: analysis.path.clone(),
            before,
            after,
            actions,
            conflicts: outcome.conflicts.len(),
        }))
    }

    /// Write planned fixes, one atomic write per file.
    ///
    /// Every path is checked against the workspace guard before anything is
    /// written.
    pub fn write(&self, plans: &[FilePlan]) -> Result<Vec<EditResult>, WorkspaceError> {
        let guard = WorkspaceGuard::with_forbidden_dirs(
            &self.root,
            self.config.files.exclude.iter().cloned(),
        )?;
        let edits = plans
            .iter()
            .map(|plan| {
                let path = guard.validate_path(&plan.path)?;
                let mut edit = plan.to_edit();
                edit.file = path;
                Ok(edit)
            })
            .collect::<Result<Vec<_>, SafetyError>>()?;

        let results = Edit::apply_batch(edits)?;
        info!(files = results.len(), "fixes written");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const WORKER: &str = "class Worker {\n    void Run(CancellationToken ct) {\n        if (ct.IsCancellationRequested)\n            throw new OperationCanceledException();\n    }\n}\n";

    #[test]
    fn discovery_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("obj/Debug")).unwrap();
        fs::write(root.join("src/Worker.cs"), WORKER).unwrap();
        fs::write(root.join("src/notes.txt"), "").unwrap();
        fs::write(root.join("obj/Debug/Generated.cs"), WORKER).unwrap();

        let workspace = Workspace::new(root, Config::default());
        let files = workspace.discover(&[root.to_path_buf()]);
        assert_eq!(files, vec![root.join("src/Worker.cs")]);
    }

    #[test]
    fn plans_and_writes_fixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Worker.cs");
        fs::write(&path, WORKER).unwrap();

        let workspace = Workspace::new(dir.path(), Config::default());
        let analysis = workspace.analyze_file(&path).unwrap();
        assert_eq!(analysis.diagnostics.len(), 1);

        let plan = workspace.plan(&analysis).unwrap().unwrap();
        assert_eq!(plan.fixed(), 1);
        assert_eq!(
            plan.actions,
            vec![FixAction {
                title: "Use ThrowIfCancellationRequested()",
                start: LineColumn { line: 3, column: 9 },
            }]
        );
        assert_eq!(
            plan.after,
            "class Worker {\n    void Run(CancellationToken ct) {\n        ct.ThrowIfCancellationRequested();\n    }\n}\n"
        );

        workspace.write(&[plan]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "class Worker {\n    void Run(CancellationToken ct) {\n        ct.ThrowIfCancellationRequested();\n    }\n}\n"
        );
    }

    #[test]
    fn disabled_rule_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Worker.cs");
        fs::write(&path, WORKER).unwrap();

        let mut config = Config::default();
        config.rule.enabled = false;
        let workspace = Workspace::new(dir.path(), config);
        let analysis = workspace.analyze_file(&path).unwrap();
        assert!(analysis.diagnostics.is_empty());
        assert!(workspace.plan(&analysis).unwrap().is_none());
    }
}
