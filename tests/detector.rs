//! Detection over complete C# documents.

use cancelcheck::syntax::LineColumn;
use cancelcheck::{detect, DeclarationOracle, Severity, SyntaxTree, TypeDescriptor};

fn diagnostics_in(source: &str) -> Vec<cancelcheck::Diagnostic> {
    let tree = SyntaxTree::parse(source).unwrap().with_path("Test0.cs");
    detect(&tree, &DeclarationOracle).collect()
}

#[test]
fn empty_text_has_no_diagnostics() {
    assert!(diagnostics_in("").is_empty());
}

#[test]
fn no_throw_has_no_diagnostic() {
    let test = r#"
    using System;
    using System.Threading.Tasks;

    namespace ConsoleApplication1
    {
        class TypeName
        {
            public async Task Test(CancellationToken ct)
            {
                if(ct.IsCancellationRequested)
                    Console.ReadKey();
            }
        }
    }"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn no_throw_block_has_no_diagnostic() {
    let test = r#"
    using System;
    using System.Threading.Tasks;

    namespace ConsoleApplication1
    {
        class TypeName
        {
            public async Task Test(CancellationToken ct)
            {
                if(ct.IsCancellationRequested)
                {
                    Console.ReadKey();
                }
            }
        }
    }"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn single_diagnostic() {
    let test = r#"
    using System;
    using System.Threading.Tasks;

    namespace ConsoleApplication1
    {
        class TypeName
        {
            public async Task Test(CancellationToken ct)
            {
                if(ct.IsCancellationRequested)
                    throw new OperationCancelledException();
            }
        }
    }"#;
    let found = diagnostics_in(test);
    assert_eq!(found.len(), 1);

    let diagnostic = &found[0];
    assert_eq!(diagnostic.id, "UseThrowIfCancellationRequested");
    assert_eq!(
        diagnostic.message,
        "Replace if statement with ThrowIfCancellationRequested()"
    );
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.location.file.to_str(), Some("Test0.cs"));
    assert_eq!(diagnostic.location.start, LineColumn { line: 11, column: 17 });
    assert_eq!(diagnostic.location.end, LineColumn { line: 12, column: 61 });
}

#[test]
fn block_with_single_throw_is_flagged() {
    let test = r#"
class TypeName
{
    public void Test(CancellationToken ct)
    {
        if (ct.IsCancellationRequested)
        {
            throw new OperationCanceledException();
        }
    }
}"#;
    let found = diagnostics_in(test);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].location.start, LineColumn { line: 6, column: 9 });
    assert_eq!(found[0].location.end, LineColumn { line: 9, column: 10 });
}

#[test]
fn two_statement_body_is_not_flagged() {
    let test = r#"
class TypeName
{
    public void Test(CancellationToken ct)
    {
        if (ct.IsCancellationRequested)
        {
            Log();
            throw new OperationCanceledException();
        }
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn token_source_receiver_is_not_flagged() {
    let test = r#"
class TypeName
{
    public void Test(CancellationTokenSource cts)
    {
        if (cts.IsCancellationRequested)
            throw new OperationCanceledException();
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn unresolved_receiver_is_not_flagged() {
    let test = r#"
class TypeName
{
    public void Test()
    {
        var ct = GetToken();
        if (ct.IsCancellationRequested)
            throw new OperationCanceledException();
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn else_branch_is_not_flagged() {
    let test = r#"
class TypeName
{
    public void Test(CancellationToken ct)
    {
        if (ct.IsCancellationRequested)
            throw new OperationCanceledException();
        else
            Work();
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn other_conditions_are_not_flagged() {
    let test = r#"
class TypeName
{
    public void Test(CancellationToken ct, bool stop)
    {
        if (!ct.IsCancellationRequested) throw new InvalidOperationException();
        if (ct.CanBeCanceled) throw new OperationCanceledException();
        if (stop) throw new OperationCanceledException();
        if (ct.IsCancellationRequested && stop) throw new OperationCanceledException();
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn qualified_receivers_are_flagged() {
    let test = r#"
class Worker
{
    private readonly CancellationToken _token;
    private Options options;

    public void Run()
    {
        if (this._token.IsCancellationRequested) throw new OperationCanceledException();
        if (options.Token.IsCancellationRequested) throw new OperationCanceledException();
    }
}"#;
    let tree = SyntaxTree::parse(test).unwrap();
    assert_eq!(detect(&tree, &DeclarationOracle).count(), 1);

    // With full type information both receivers qualify.
    let oracle =
        |_: &cancelcheck::syntax::SyntaxElement| Some(TypeDescriptor::new("System.Threading.CancellationToken"));
    assert_eq!(detect(&tree, &oracle).count(), 2);
}

#[test]
fn nested_matches_each_report() {
    let test = r#"
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
}"#;
    let found = diagnostics_in(test);
    assert_eq!(found.len(), 2);
    assert!(found[0].location.byte_start < found[1].location.byte_start);
    assert!(found[0].location.span().contains(&found[1].location.byte_start));
}

#[test]
fn malformed_if_is_skipped() {
    let test = r#"
class Worker
{
    public void Run(CancellationToken ct)
    {
        if (ct.IsCancellationRequested throw new OperationCanceledException();
    }
}"#;
    assert!(diagnostics_in(test).is_empty());
}

#[test]
fn diagnostics_serialize_to_json() {
    let test = "class A { void M(CancellationToken ct) { if (ct.IsCancellationRequested) throw null; } }";
    let found = diagnostics_in(test);
    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json[0]["id"], "UseThrowIfCancellationRequested");
    assert_eq!(json[0]["severity"], "warning");
    assert_eq!(json[0]["location"]["start"]["line"], 1);
    assert_eq!(json[0]["location"]["file"], "Test0.cs");
}

#[test]
fn conditional_section_in_body_is_not_flagged() {
    let test = r#"
class Worker
{
    public void Run(CancellationToken ct)
    {
        if (ct.IsCancellationRequested)
        {
#if DEBUG
            throw new OperationCanceledException();
#endif
        }
    }
}"#;
    let tree = SyntaxTree::parse(test).unwrap();
    assert!(!tree.has_errors());
    assert_eq!(detect(&tree, &DeclarationOracle).count(), 0);
}
