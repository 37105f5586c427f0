//! Type resolution for expressions.
//!
//! The detector never looks types up itself; it asks a [`TypeOracle`]
//! supplied by the caller. A real compiler front end, the declaration-based
//! [`DeclarationOracle`] shipped here, or a closure in a test can all play
//! that role.

pub mod declarations;

pub use declarations::DeclarationOracle;

use crate::syntax::SyntaxElement;

/// The statically resolved type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: String,
    qualified_name: String,
}

impl TypeDescriptor {
    /// Describe a type by its (possibly qualified) name.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let name = simple_name(&qualified_name);
        Self {
            name,
            qualified_name,
        }
    }

    /// Describe the type written in a declaration, or `None` when the text
    /// does not name a type by itself (`var`, tuples, arrays, pointers).
    pub fn from_type_syntax(text: &str) -> Option<Self> {
        let compact: String = text.split_whitespace().collect();
        if compact.is_empty()
            || compact == "var"
            || compact.starts_with('(')
            || compact.ends_with(']')
            || compact.ends_with('*')
        {
            return None;
        }
        if let Some(inner) = compact.strip_suffix('?') {
            return Some(Self {
                name: "Nullable".to_string(),
                qualified_name: format!("System.Nullable<{inner}>"),
            });
        }
        Some(Self::new(compact))
    }

    /// Simple name: no namespace, no containing type, no generic arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

/// Strip alias qualifiers, namespaces and generic arguments.
fn simple_name(qualified: &str) -> String {
    let unaliased = qualified.rsplit("::").next().unwrap_or(qualified);

    let mut depth = 0usize;
    let mut segment_start = 0;
    for (i, c) in unaliased.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => segment_start = i + 1,
            _ => {}
        }
    }

    let last = &unaliased[segment_start..];
    let end = last.find('<').unwrap_or(last.len());
    last[..end].trim().to_string()
}

/// Resolves the static type of an expression.
pub trait TypeOracle {
    /// The expression's type, or `None` when it cannot be determined.
    fn resolve_type(&self, expression: &SyntaxElement) -> Option<TypeDescriptor>;
}

impl<F> TypeOracle for F
where
    F: Fn(&SyntaxElement) -> Option<TypeDescriptor>,
{
    fn resolve_type(&self, expression: &SyntaxElement) -> Option<TypeDescriptor> {
        self(expression)
    }
}
