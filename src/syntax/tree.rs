use crate::pool;
use crate::syntax::errors::SyntaxError;
use crate::syntax::green::{GreenElement, GreenNode};
use crate::syntax::red::SyntaxNode;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable syntax tree for one source file.
///
/// Cloning is cheap. Every transformation returns a new tree; the original
/// stays valid for any other reader.
#[derive(Clone)]
pub struct SyntaxTree {
    root: Arc<GreenNode>,
    path: Arc<PathBuf>,
}

impl SyntaxTree {
    pub fn new(root: Arc<GreenNode>) -> Self {
        Self {
            root,
            path: Arc::new(PathBuf::new()),
        }
    }

    /// Parse C# source text with the thread's pooled parser.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let green = pool::with_parser(|parser| parser.parse(source))??;
        Ok(Self::new(Arc::new(green)))
    }

    /// Read and parse a file; the tree remembers the path for diagnostics.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, SyntaxError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SyntaxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source)?.with_path(path))
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Arc::new(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.root
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(Arc::clone(&self.root))
    }

    /// Same file, different root.
    pub fn with_root(&self, root: Arc<GreenNode>) -> Self {
        Self {
            root,
            path: Arc::clone(&self.path),
        }
    }

    /// True when `node` was obtained from this tree's root.
    pub fn contains(&self, node: &SyntaxNode) -> bool {
        Arc::ptr_eq(node.root().green(), &self.root)
    }

    pub fn has_errors(&self) -> bool {
        self.root.has_error()
    }

    /// Serialize back to source text, trivia included.
    pub fn to_source(&self) -> String {
        self.root.to_full_string()
    }

    /// Replace the element reached by following child indices from the root.
    ///
    /// Returns `None` when the path does not exist or is empty.
    pub fn replace_at_path(&self, path: &[usize], replacement: GreenElement) -> Option<Self> {
        let root = replace_in(&self.root, path, replacement)?;
        Some(self.with_root(Arc::new(root)))
    }

    /// Element at the given child-index path.
    pub fn element_at_path(&self, path: &[usize]) -> Option<GreenElement> {
        let mut current = GreenElement::Node(Arc::clone(&self.root));
        for &index in path {
            current = match current {
                GreenElement::Node(node) => node.children().get(index)?.clone(),
                GreenElement::Token(_) => return None,
            };
        }
        Some(current)
    }
}

fn replace_in(node: &GreenNode, path: &[usize], replacement: GreenElement) -> Option<GreenNode> {
    let (&index, rest) = path.split_first()?;
    let child = node.children().get(index)?;
    let new_child = if rest.is_empty() {
        replacement
    } else {
        match child {
            GreenElement::Node(inner) => {
                GreenElement::Node(Arc::new(replace_in(inner, rest, replacement)?))
            }
            GreenElement::Token(_) => return None,
        }
    };
    Some(node.replace_child(index, new_child))
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("path", &self.path)
            .field("width", &self.root.full_width())
            .finish()
    }
}
