/// Kinds of syntax elements the analysis cares about.
///
/// Grammar kinds without a dedicated variant are kept as [`SyntaxKind::Other`]
/// with their raw tree-sitter name, so no information is lost when a tree is
/// built from the parser output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Nodes
    CompilationUnit,
    IfStatement,
    ElseClause,
    Block,
    ThrowStatement,
    ExpressionStatement,
    LocalDeclarationStatement,
    MemberAccessExpression,
    InvocationExpression,
    ArgumentList,
    ThisExpression,
    ClassDeclaration,
    StructDeclaration,
    RecordDeclaration,
    InterfaceDeclaration,
    DeclarationList,
    MethodDeclaration,
    ConstructorDeclaration,
    LocalFunctionStatement,
    LambdaExpression,
    AnonymousMethodExpression,
    ParameterList,
    Parameter,
    VariableDeclaration,
    VariableDeclarator,
    FieldDeclaration,
    PropertyDeclaration,
    EqualsValueClause,
    Modifier,
    AttributeList,
    Error,

    // Tokens
    Identifier,
    IfKeyword,
    ElseKeyword,
    ThrowKeyword,
    ThisKeyword,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Dot,
    Equals,
    EndOfFile,

    /// Any other grammar kind, by raw tree-sitter name.
    Other(&'static str),
}

impl SyntaxKind {
    /// Map a raw tree-sitter kind name to a syntax kind.
    pub fn from_raw(raw: &'static str) -> Self {
        match raw {
            "compilation_unit" => SyntaxKind::CompilationUnit,
            "if_statement" => SyntaxKind::IfStatement,
            "else_clause" => SyntaxKind::ElseClause,
            "block" => SyntaxKind::Block,
            "throw_statement" => SyntaxKind::ThrowStatement,
            "expression_statement" => SyntaxKind::ExpressionStatement,
            "local_declaration_statement" => SyntaxKind::LocalDeclarationStatement,
            "member_access_expression" => SyntaxKind::MemberAccessExpression,
            "invocation_expression" => SyntaxKind::InvocationExpression,
            "argument_list" => SyntaxKind::ArgumentList,
            "this_expression" => SyntaxKind::ThisExpression,
            "class_declaration" => SyntaxKind::ClassDeclaration,
            "struct_declaration" => SyntaxKind::StructDeclaration,
            "record_declaration" | "record_struct_declaration" => SyntaxKind::RecordDeclaration,
            "interface_declaration" => SyntaxKind::InterfaceDeclaration,
            "declaration_list" => SyntaxKind::DeclarationList,
            "method_declaration" => SyntaxKind::MethodDeclaration,
            "constructor_declaration" => SyntaxKind::ConstructorDeclaration,
            "local_function_statement" => SyntaxKind::LocalFunctionStatement,
            "lambda_expression" => SyntaxKind::LambdaExpression,
            "anonymous_method_expression" => SyntaxKind::AnonymousMethodExpression,
            "parameter_list" => SyntaxKind::ParameterList,
            "parameter" => SyntaxKind::Parameter,
            "variable_declaration" => SyntaxKind::VariableDeclaration,
            "variable_declarator" => SyntaxKind::VariableDeclarator,
            "field_declaration" => SyntaxKind::FieldDeclaration,
            "property_declaration" => SyntaxKind::PropertyDeclaration,
            "equals_value_clause" => SyntaxKind::EqualsValueClause,
            "modifier" => SyntaxKind::Modifier,
            "attribute_list" => SyntaxKind::AttributeList,
            "ERROR" => SyntaxKind::Error,
            "identifier" => SyntaxKind::Identifier,
            "if" => SyntaxKind::IfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "throw" => SyntaxKind::ThrowKeyword,
            "this" => SyntaxKind::ThisKeyword,
            "(" => SyntaxKind::OpenParen,
            ")" => SyntaxKind::CloseParen,
            "{" => SyntaxKind::OpenBrace,
            "}" => SyntaxKind::CloseBrace,
            ";" => SyntaxKind::Semicolon,
            "." => SyntaxKind::Dot,
            "=" => SyntaxKind::Equals,
            other => SyntaxKind::Other(other),
        }
    }

    /// Raw grammar name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxKind::CompilationUnit => "compilation_unit",
            SyntaxKind::IfStatement => "if_statement",
            SyntaxKind::ElseClause => "else_clause",
            SyntaxKind::Block => "block",
            SyntaxKind::ThrowStatement => "throw_statement",
            SyntaxKind::ExpressionStatement => "expression_statement",
            SyntaxKind::LocalDeclarationStatement => "local_declaration_statement",
            SyntaxKind::MemberAccessExpression => "member_access_expression",
            SyntaxKind::InvocationExpression => "invocation_expression",
            SyntaxKind::ArgumentList => "argument_list",
            SyntaxKind::ThisExpression => "this_expression",
            SyntaxKind::ClassDeclaration => "class_declaration",
            SyntaxKind::StructDeclaration => "struct_declaration",
            SyntaxKind::RecordDeclaration => "record_declaration",
            SyntaxKind::InterfaceDeclaration => "interface_declaration",
            SyntaxKind::DeclarationList => "declaration_list",
            SyntaxKind::MethodDeclaration => "method_declaration",
            SyntaxKind::ConstructorDeclaration => "constructor_declaration",
            SyntaxKind::LocalFunctionStatement => "local_function_statement",
            SyntaxKind::LambdaExpression => "lambda_expression",
            SyntaxKind::AnonymousMethodExpression => "anonymous_method_expression",
            SyntaxKind::ParameterList => "parameter_list",
            SyntaxKind::Parameter => "parameter",
            SyntaxKind::VariableDeclaration => "variable_declaration",
            SyntaxKind::VariableDeclarator => "variable_declarator",
            SyntaxKind::FieldDeclaration => "field_declaration",
            SyntaxKind::PropertyDeclaration => "property_declaration",
            SyntaxKind::EqualsValueClause => "equals_value_clause",
            SyntaxKind::Modifier => "modifier",
            SyntaxKind::AttributeList => "attribute_list",
            SyntaxKind::Error => "ERROR",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::ThrowKeyword => "throw",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::OpenParen => "(",
            SyntaxKind::CloseParen => ")",
            SyntaxKind::OpenBrace => "{",
            SyntaxKind::CloseBrace => "}",
            SyntaxKind::Semicolon => ";",
            SyntaxKind::Dot => ".",
            SyntaxKind::Equals => "=",
            SyntaxKind::EndOfFile => "end_of_file",
            SyntaxKind::Other(raw) => raw,
        }
    }

    /// Type declarations whose members can declare fields and properties.
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDeclaration
                | SyntaxKind::StructDeclaration
                | SyntaxKind::RecordDeclaration
                | SyntaxKind::InterfaceDeclaration
        )
    }

    /// Constructs that own a parameter list.
    pub fn has_parameters(self) -> bool {
        matches!(
            self,
            SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::LocalFunctionStatement
                | SyntaxKind::LambdaExpression
                | SyntaxKind::AnonymousMethodExpression
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_names_round_trip() {
        for raw in ["if_statement", "block", "throw_statement", "identifier", "(", ";"] {
            assert_eq!(SyntaxKind::from_raw(raw).as_str(), raw);
        }
    }

    #[test]
    fn unknown_kinds_are_kept() {
        let kind = SyntaxKind::from_raw("switch_statement");
        assert_eq!(kind, SyntaxKind::Other("switch_statement"));
        assert_eq!(kind.as_str(), "switch_statement");
    }
}
