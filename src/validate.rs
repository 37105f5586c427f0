//! Post-fix validation.
//!
//! A fixed file is re-parsed before it is written. If the fixed text has
//! syntax errors the original did not have, the fix is refused; files that
//! were already broken stay as broken as they were, never more.

use crate::pool;
use crate::syntax::SyntaxError;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("fix introduced {count} syntax error(s)")]
    ParseErrorIntroduced {
        count: usize,
        errors: Vec<ErrorLocation>,
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// An error or missing node reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub byte_start: usize,
    pub byte_end: usize,
    pub line: usize,
    pub column: usize,
    /// Surrounding text with line breaks escaped
    pub context: String,
}

/// Refuse `edited` if it has syntax errors that `original` does not.
///
/// Offsets move when text is replaced, so errors are compared by the text
/// they cover rather than by position.
pub fn validate_edit(original: &str, edited: &str) -> Result<(), ValidationError> {
    let (before, after) = pool::with_parser(|parser| {
        let before = parser.parse_raw(original)?;
        let after = parser.parse_raw(edited)?;
        Ok::<_, SyntaxError>((
            collect_errors(before.root_node(), original),
            collect_errors(after.root_node(), edited),
        ))
    })??;

    let mut known: HashMap<&str, usize> = HashMap::new();
    for error in &before {
        *known.entry(&original[error.byte_start..error.byte_end]).or_default() += 1;
    }

    let introduced: Vec<ErrorLocation> = after
        .into_iter()
        .filter(|error| {
            match known.get_mut(&edited[error.byte_start..error.byte_end]) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    false
                }
                _ => true,
            }
        })
        .collect();

    if introduced.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ParseErrorIntroduced {
            count: introduced.len(),
            errors: introduced,
        })
    }
}

fn collect_errors(root: tree_sitter::Node<'_>, source: &str) -> Vec<ErrorLocation> {
    let mut errors = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let start = node.start_position();
            let (byte_start, byte_end) = (node.start_byte(), node.end_byte());
            let context = source
                .get(byte_start.saturating_sub(20)..(byte_end + 20).min(source.len()))
                .unwrap_or("")
                .replace('\n', "\\n");
            errors.push(ErrorLocation {
                byte_start,
                byte_end,
                line: start.row + 1,
                column: start.column + 1,
                context,
            });
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    errors.sort_by_key(|error| error.byte_start);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_edit_passes() {
        let original = "class A { void M(CancellationToken ct) { if (ct.IsCancellationRequested) throw null; } }";
        let edited = "class A { void M(CancellationToken ct) { ct.ThrowIfCancellationRequested(); } }";
        assert!(validate_edit(original, edited).is_ok());
    }

    #[test]
    fn reports_error_locations() {
        let err = validate_edit("class A { void M() { Run(); } }", "class A { void M() { Run( } }")
            .unwrap_err();
        let ValidationError::ParseErrorIntroduced { count, errors } = err else {
            panic!("expected parse errors");
        };
        assert!(count > 0);
        assert!(errors.iter().all(|error| error.line == 1));
    }

    #[test]
    fn existing_errors_are_tolerated() {
        let original = "class A { void M() { Run() } void N() { if (x) throw null; } }";
        let edited = "class A { void M() { Run() } void N() { x.Stop(); } }";
        assert!(validate_edit(original, edited).is_ok());
    }

    #[test]
    fn new_errors_are_refused() {
        let original = "class A { void M() { Run(); } }";
        let edited = "class A { void M() { Run(; } }";
        assert!(matches!(
            validate_edit(original, edited),
            Err(ValidationError::ParseErrorIntroduced { .. })
        ));
    }
}
