//! C# syntax trees.
//!
//! Source text is parsed with tree-sitter into an immutable, lossless
//! red/green tree. Green elements are shared between tree versions, trivia
//! (whitespace, comments, directives) is stored on tokens, and every
//! rewrite produces a new [`SyntaxTree`] without touching the old one.

pub mod ast;
pub mod errors;
pub mod green;
pub mod kind;
pub mod line_index;
pub mod make;
pub mod parser;
pub mod red;
pub mod tree;

pub use errors::SyntaxError;
pub use green::{Annotation, GreenElement, GreenNode, GreenToken};
pub use kind::SyntaxKind;
pub use line_index::{LineColumn, LineIndex};
pub use parser::CSharpParser;
pub use red::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use tree::SyntaxTree;
