//! Thread-local parser pooling.
//!
//! Tree-sitter parsers are not shareable between threads, so each thread
//! lazily creates one and reuses it for every parse it performs.

use crate::syntax::{CSharpParser, SyntaxError};
use std::cell::RefCell;

thread_local! {
    static CSHARP_PARSER: RefCell<Option<CSharpParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// On first call per thread, creates new parser. Subsequent calls reuse
/// the same parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use cancelcheck::pool::with_parser;
///
/// let green = with_parser(|parser| parser.parse("class A {}"))??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, SyntaxError>
where
    F: FnOnce(&mut CSharpParser) -> R,
{
    CSHARP_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => CSharpParser::new()?,
        };
        Ok(f(slot.insert(parser)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_parser_across_calls() {
        let first = with_parser(|parser| parser.parse("class A {}")).unwrap().unwrap();
        let second = with_parser(|parser| parser.parse("class B {}")).unwrap().unwrap();
        assert_eq!(first.to_full_string(), "class A {}");
        assert_eq!(second.to_full_string(), "class B {}");
    }
}
