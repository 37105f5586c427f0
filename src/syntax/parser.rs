use crate::syntax::errors::SyntaxError;
use crate::syntax::green::{GreenElement, GreenNode, GreenToken};
use crate::syntax::kind::SyntaxKind;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser wrapper for C# source code.
///
/// Produces lossless green trees: every byte of the input ends up either in a
/// token or in a token's trivia.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::CSharp.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| SyntaxError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a raw tree-sitter tree.
    pub fn parse_raw(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseFailed)
    }

    /// Parse source code into a green tree rooted at the compilation unit.
    pub fn parse(&mut self, source: &str) -> Result<GreenNode, SyntaxError> {
        let tree = self.parse_raw(source)?;
        Ok(build_green(tree.root_node(), source))
    }
}

/// A leaf of the concrete tree, in source order.
struct Leaf {
    kind: &'static str,
    start: usize,
    end: usize,
    missing: bool,
}

fn build_green(root: Node<'_>, source: &str) -> GreenNode {
    let mut leaves = Vec::new();
    for child in named_and_anonymous_children(root) {
        collect_leaves(child, &mut leaves);
    }

    let (tokens, eof_leading) = attach_trivia(&leaves, source);
    let mut tokens = tokens.into_iter();

    let mut children: Vec<GreenElement> = named_and_anonymous_children(root)
        .into_iter()
        .filter_map(|child| build_element(child, &mut tokens))
        .collect();
    children.push(GreenToken::new(SyntaxKind::EndOfFile, "").with_leading(eof_leading).into());

    let node = GreenNode::new(SyntaxKind::from_raw(root.kind()), children);
    if root.is_error() {
        node.with_error()
    } else {
        node
    }
}

fn named_and_anonymous_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Extras (comments, and directives the grammar treats as extras) are folded
/// into trivia unless they carry a parse error. Conditional sections such as
/// `#if ... #endif` inside a block are structural nodes and stay in the tree.
fn is_trivia(node: Node<'_>) -> bool {
    node.is_extra() && !node.has_error()
}

fn collect_leaves(node: Node<'_>, leaves: &mut Vec<Leaf>) {
    if is_trivia(node) {
        return;
    }
    if node.child_count() == 0 {
        leaves.push(Leaf {
            kind: node.kind(),
            start: node.start_byte(),
            end: node.end_byte(),
            missing: node.is_missing(),
        });
        return;
    }
    for child in named_and_anonymous_children(node) {
        collect_leaves(child, leaves);
    }
}

fn build_element(
    node: Node<'_>,
    tokens: &mut impl Iterator<Item = GreenToken>,
) -> Option<GreenElement> {
    if is_trivia(node) {
        return None;
    }
    if node.child_count() == 0 {
        return tokens.next().map(GreenElement::from);
    }

    let children: Vec<GreenElement> = named_and_anonymous_children(node)
        .into_iter()
        .filter_map(|child| build_element(child, tokens))
        .collect();
    let green = GreenNode::new(SyntaxKind::from_raw(node.kind()), children);
    if node.is_error() || node.is_missing() {
        Some(green.with_error().into())
    } else {
        Some(green.into())
    }
}

/// Turn leaves into tokens, distributing the text between them as trivia.
///
/// Returns the tokens and the leading trivia of the end-of-file token.
fn attach_trivia(leaves: &[Leaf], source: &str) -> (Vec<GreenToken>, String) {
    let mut tokens: Vec<GreenToken> = Vec::with_capacity(leaves.len());
    let mut cursor = 0;

    for leaf in leaves {
        let start = leaf.start.max(cursor);
        let end = leaf.end.max(start);
        let gap = &source[cursor..start];

        let leading = match tokens.last_mut() {
            Some(previous) => {
                let split = trailing_split(gap);
                *previous = previous.clone().with_trailing(&gap[..split]);
                &gap[split..]
            }
            None => gap,
        };

        let token = if leaf.missing {
            GreenToken::missing(SyntaxKind::from_raw(leaf.kind))
        } else {
            GreenToken::new(SyntaxKind::from_raw(leaf.kind), &source[start..end])
        };
        tokens.push(token.with_leading(leading));
        cursor = end;
    }

    let tail = &source[cursor..];
    let eof_leading = match tokens.last_mut() {
        Some(last) => {
            let split = trailing_split(tail);
            *last = last.clone().with_trailing(&tail[..split]);
            tail[split..].to_string()
        }
        None => tail.to_string(),
    };

    (tokens, eof_leading)
}

/// Length of the prefix of `gap` that trails the previous token: everything
/// up to and including the first line break outside a block comment.
pub(crate) fn trailing_split(gap: &str) -> usize {
    let bytes = gap.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'\n', _) => return i + 1,
            (b'/', Some(b'*')) => match gap[i + 2..].find("*/") {
                Some(close) => i += 2 + close + 2,
                None => return gap.len(),
            },
            (b'/', Some(b'/')) => match gap[i..].find('\n') {
                Some(newline) => return i + newline + 1,
                None => return gap.len(),
            },
            _ => i += 1,
        }
    }
    gap.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lossless() {
        let mut parser = CSharpParser::new().unwrap();
        let source = "  // header\nclass A {\n    void M() { /* inline */ Run(); }\n}\n\n";
        let green = parser.parse(source).unwrap();

        assert_eq!(green.kind(), SyntaxKind::CompilationUnit);
        assert_eq!(green.to_full_string(), source);
        assert!(!green.has_error());
    }

    #[test]
    fn empty_source_keeps_only_end_of_file() {
        let mut parser = CSharpParser::new().unwrap();
        let green = parser.parse("   \n").unwrap();
        assert_eq!(green.to_full_string(), "   \n");
        assert_eq!(
            green.children().last().map(GreenElement::kind),
            Some(SyntaxKind::EndOfFile)
        );
    }

    #[test]
    fn parse_invalid_source_flags_errors() {
        let mut parser = CSharpParser::new().unwrap();
        let source = "class A { void M( { }";
        let green = parser.parse(source).unwrap();

        assert!(green.has_error());
        assert_eq!(green.to_full_string(), source);
    }

    #[test]
    fn trailing_trivia_stops_after_first_line_break() {
        assert_eq!(trailing_split(" \n    "), 2);
        assert_eq!(trailing_split(" // note\n  "), 9);
        assert_eq!(trailing_split(" /* a\n b */\n  "), 12);
        assert_eq!(trailing_split("   "), 3);
        assert_eq!(trailing_split(""), 0);
    }
}
