//! Document-wide fixes.

use cancelcheck::{detect, fix_all, format_annotated, DeclarationOracle, Diagnostic, SyntaxTree};
use proptest::prelude::*;

const MANY: &str = r#"
class Worker
{
    public void Run(CancellationToken ct, CancellationToken linked)
    {
        if (ct.IsCancellationRequested)
            throw new OperationCanceledException();
        Step();
        if (linked.IsCancellationRequested)
        {
            throw new OperationCanceledException();
        }
        Step();
        if (ct.IsCancellationRequested) throw new TaskCanceledException();
    }

    public void Idle(CancellationToken token)
    {
        while (true)
        {
            if (token.IsCancellationRequested) throw new OperationCanceledException();
        }
    }
}
"#;

const NESTED: &str = r#"
class Worker
{
    public void Run(CancellationToken ct)
    {
        if (ct.IsCancellationRequested)
            throw new OperationCanceledException(Describe(() =>
            {
                if (ct.IsCancellationRequested) throw new OperationCanceledException();
            }));
    }
}
"#;

fn diagnostics(tree: &SyntaxTree) -> Vec<Diagnostic> {
    detect(tree, &DeclarationOracle).collect()
}

#[test]
fn fixes_every_statement_in_the_document() {
    let tree = SyntaxTree::parse(MANY).unwrap();
    let found = diagnostics(&tree);
    assert_eq!(found.len(), 4);

    let outcome = fix_all(&tree, &found).unwrap();
    assert_eq!(outcome.fixed(), 4);
    assert!(outcome.conflicts.is_empty());

    let formatted = format_annotated(&outcome.tree).to_source();
    assert_eq!(
        formatted,
        r#"
class Worker
{
    public void Run(CancellationToken ct, CancellationToken linked)
    {
        ct.ThrowIfCancellationRequested();
        Step();
        linked.ThrowIfCancellationRequested();
        Step();
        ct.ThrowIfCancellationRequested();
    }

    public void Idle(CancellationToken token)
    {
        while (true)
        {
            token.ThrowIfCancellationRequested();
        }
    }
}
"#
    );
}

#[test]
fn applied_fixes_are_in_document_order() {
    let tree = SyntaxTree::parse(MANY).unwrap();
    let outcome = fix_all(&tree, &diagnostics(&tree)).unwrap();
    let starts: Vec<usize> = outcome
        .applied
        .iter()
        .map(|fix| fix.full_range().start)
        .collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert!(outcome
        .applied
        .iter()
        .all(|fix| fix.equivalence_key() == "UseThrowIfCancellationRequested"));
}

#[test]
fn nested_fix_yields_to_the_enclosing_one() {
    let tree = SyntaxTree::parse(NESTED).unwrap();
    let found = diagnostics(&tree);
    assert_eq!(found.len(), 2);

    let outcome = fix_all(&tree, &found).unwrap();
    assert_eq!(outcome.fixed(), 1);
    assert_eq!(outcome.conflicts.len(), 1);
    assert!(outcome.applied[0].encloses(&outcome.conflicts[0]));

    let source = outcome.tree.to_source();
    assert!(source.contains("ct.ThrowIfCancellationRequested();"));
    assert!(!source.contains("Describe"));
    assert!(!outcome.tree.has_errors());
}

#[test]
fn input_tree_survives_fix_all() {
    let tree = SyntaxTree::parse(MANY).unwrap();
    let found = diagnostics(&tree);
    let _ = fix_all(&tree, &found).unwrap();
    assert_eq!(tree.to_source(), MANY);
    assert_eq!(diagnostics(&tree), found);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The merged document does not depend on diagnostic order.
    #[test]
    fn order_of_diagnostics_does_not_matter(
        shuffled in Just(diagnostics(&SyntaxTree::parse(MANY).unwrap())).prop_shuffle()
    ) {
        let tree = SyntaxTree::parse(MANY).unwrap();
        let expected = fix_all(&tree, &diagnostics(&tree)).unwrap().tree.to_source();
        let outcome = fix_all(&tree, &shuffled).unwrap();
        prop_assert_eq!(outcome.tree.to_source(), expected);
        prop_assert_eq!(outcome.fixed(), 4);
    }

    /// Parsing keeps every byte, whatever the input looks like.
    #[test]
    fn parse_is_lossless(source in "[a-zA-Z0-9_ (){};.=!\n\t/*\"]{0,200}") {
        let tree = SyntaxTree::parse(&source).unwrap();
        prop_assert_eq!(tree.to_source(), source);
    }

    /// Fixing a document never breaks its syntax.
    #[test]
    fn fixes_keep_documents_parseable(picked in proptest::sample::subsequence(vec![0usize, 1, 2, 3], 0..=4)) {
        let tree = SyntaxTree::parse(MANY).unwrap();
        let all = diagnostics(&tree);
        let chosen: Vec<Diagnostic> = picked.iter().map(|&i| all[i].clone()).collect();
        let outcome = fix_all(&tree, &chosen).unwrap();
        prop_assert_eq!(outcome.fixed(), chosen.len());
        prop_assert!(!outcome.tree.has_errors());
        prop_assert_eq!(diagnostics(&outcome.tree).len(), all.len() - chosen.len());
    }
}
