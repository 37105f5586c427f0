//! cancelcheck: find and fix C# cancellation checks that throw by hand
//!
//! ```csharp
//! if (ct.IsCancellationRequested)
//!     throw new OperationCanceledException();
//! ```
//!
//! is reported and rewritten to `ct.ThrowIfCancellationRequested();`.
//!
//! # Architecture
//!
//! Source text is parsed into an immutable, lossless [`SyntaxTree`]. The
//! [`detect`] pass matches `if` statements by shape and asks a
//! [`TypeOracle`] whether the receiver is a `CancellationToken`. The
//! rewriter turns a flagged statement into a new tree, sharing every
//! untouched subtree with the old one; [`fix_all`] merges every fix of a
//! document. Writing back to disk goes through the verified [`Edit`]
//! primitive, guarded by [`WorkspaceGuard`] and re-parse validation.
//!
//! # Example
//!
//! ```no_run
//! use cancelcheck::{detect, rewrite_at, DeclarationOracle, SyntaxTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = SyntaxTree::parse(
//!     "class A { void M(CancellationToken ct) { if (ct.IsCancellationRequested) throw null; } }",
//! )?;
//! for diagnostic in detect(&tree, &DeclarationOracle) {
//!     let fixed = rewrite_at(&tree, diagnostic.location.byte_start)?;
//!     println!("{fixed}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod detector;
pub mod diagnostic;
pub mod edit;
pub mod fix_all;
pub mod formatter;
pub mod pattern;
pub mod pool;
pub mod rewriter;
pub mod rule;
pub mod safety;
pub mod semantic;
pub mod syntax;
pub mod validate;
pub mod workspace;

// Re-exports
pub use config::{Config, ConfigError};
pub use detector::{detect, Detector};
pub use diagnostic::{Diagnostic, Location};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use fix_all::{fix_all, FixAllOutcome};
pub use formatter::format_annotated;
pub use pattern::{CancellationCheck, ShapeMismatch};
pub use rewriter::{locate_if_statement, plan_fix, rewrite, rewrite_at, Fix, RewriteError};
pub use rule::{Severity, USE_THROW_IF_CANCELLATION_REQUESTED};
pub use safety::{SafetyError, WorkspaceGuard};
pub use semantic::{DeclarationOracle, TypeDescriptor, TypeOracle};
pub use syntax::{SyntaxError, SyntaxTree};
pub use validate::{ErrorLocation, ValidationError};
pub use workspace::{FileAnalysis, FilePlan, FixAction, Workspace, WorkspaceError};
