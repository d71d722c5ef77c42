#![warn(clippy::pedantic)]

pub mod capsule_resolver;
pub mod parser;

pub use capsule_resolver::{CapsuleMap, CapsuleResolver};
pub use parser::parse;

#[cfg(test)]
mod tests {
    use super::*;
    use theta_ast::nodes::Node;
    use theta_lexer::lex;

    fn parse_source(source: &str) -> (Node, theta_ast::diagnostic::DiagnosticSink) {
        parse(lex(source))
    }

    #[test]
    fn parses_trivial_capsule() {
        let (source, diagnostics) = parse_source("capsule Main { main = () -> 15 }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.as_slice());
        let Node::Source(src) = source else { panic!("expected Source") };
        let value = src.value.borrow();
        let Some(Node::Capsule(capsule)) = value.as_ref() else {
            panic!("expected Capsule")
        };
        assert_eq!(capsule.name, "Main");
        assert_eq!(capsule.elements.borrow().len(), 1);
    }

    #[test]
    fn precedence_binds_multiplication_tighter_than_addition() {
        let (source, diagnostics) = parse_source("a + b * c");
        assert!(diagnostics.is_empty());
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::BinaryOperation(top)) = value.as_ref() else {
            panic!("expected top-level binary op")
        };
        assert_eq!(top.operator, "+");
        assert!(matches!(&*top.right.borrow(), Node::BinaryOperation(r) if r.operator == "*"));
    }

    #[test]
    fn exponent_chain_is_left_associative() {
        let (source, _) = parse_source("2 ** 3 ** 2");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::BinaryOperation(top)) = value.as_ref() else {
            panic!("expected binary op")
        };
        assert_eq!(top.operator, "**");
        assert!(matches!(&*top.left.borrow(), Node::BinaryOperation(_)));
        assert!(matches!(&*top.right.borrow(), Node::NumberLiteral(_)));
    }

    #[test]
    fn parenthesized_single_expression_is_not_wrapped() {
        let (source, _) = parse_source("(5)");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        assert!(matches!(value.as_ref(), Some(Node::NumberLiteral(_))));
    }

    #[test]
    fn parenthesized_multi_expression_becomes_ast_node_list() {
        let (source, _) = parse_source("(1, 2, 3)");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::AstNodeList(list)) = value.as_ref() else {
            panic!("expected AstNodeList")
        };
        assert_eq!(list.elements.borrow().len(), 3);
    }

    #[test]
    fn brace_with_colon_parses_as_dictionary() {
        let (source, _) = parse_source("{ a: 1, b: 2 }");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        assert!(matches!(value.as_ref(), Some(Node::Dictionary(_))));
    }

    #[test]
    fn brace_with_comma_only_parses_as_tuple() {
        let (source, _) = parse_source("{ a, b }");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::Tuple(t)) = value.as_ref() else { panic!("expected Tuple") };
        assert_eq!(t.elements.borrow().len(), 2);
    }

    #[test]
    fn brace_with_statements_only_parses_as_block() {
        let (source, _) = parse_source("{ return 1 }");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        assert!(matches!(value.as_ref(), Some(Node::Block(_))));
    }

    #[test]
    fn if_else_if_else_chain_builds_three_branches() {
        let (source, diagnostics) = parse_source("if a { 1 } else if b { 2 } else { 3 }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.as_slice());
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::ControlFlow(cf)) = value.as_ref() else {
            panic!("expected ControlFlow")
        };
        assert_eq!(cf.branches.borrow().len(), 3);
        assert!(cf.branches.borrow()[2].condition.is_none());
    }

    #[test]
    fn single_param_function_does_not_need_parens() {
        let (source, _) = parse_source("a -> a + 1");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::FunctionDeclaration(func)) = value.as_ref() else {
            panic!("expected FunctionDeclaration")
        };
        assert_eq!(func.params.len(), 1);
    }

    #[test]
    fn zero_param_function_may_omit_parens() {
        let (source, _) = parse_source("-> 5");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::FunctionDeclaration(func)) = value.as_ref() else {
            panic!("expected FunctionDeclaration")
        };
        assert_eq!(func.params.len(), 0);
    }

    #[test]
    fn function_invocation_parses_arguments() {
        let (source, _) = parse_source("foo(1, 2)");
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::FunctionInvocation(inv)) = value.as_ref() else {
            panic!("expected FunctionInvocation")
        };
        assert_eq!(inv.arguments.borrow().len(), 2);
    }

    #[test]
    fn invalid_identifier_reports_syntax_error_but_continues() {
        let (_source, diagnostics) = parse_source("1bad = 2");
        assert!(diagnostics
            .as_slice()
            .iter()
            .any(|d| d.kind == theta_ast::diagnostic::DiagnosticKind::SyntaxError));
    }

    #[test]
    fn leftover_tokens_after_top_level_parse_report_parse_error() {
        let (_source, diagnostics) = parse_source("5 ) )");
        assert!(diagnostics
            .as_slice()
            .iter()
            .any(|d| d.kind == theta_ast::diagnostic::DiagnosticKind::ParseError));
    }

    #[test]
    fn enum_unpacks_colon_prefixed_symbols() {
        let (source, diagnostics) = parse_source("enum Color { :red :green :blue }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.as_slice());
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::Enum(e)) = value.as_ref() else { panic!("expected Enum") };
        assert_eq!(e.symbols.len(), 3);
    }

    #[test]
    fn struct_declaration_literal_parses_into_dictionary_value() {
        let (source, diagnostics) = parse_source("@Point { x: 1, y: 2 }");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.as_slice());
        let Node::Source(src) = source else { panic!() };
        let value = src.value.borrow();
        let Some(Node::StructDeclaration(decl)) = value.as_ref() else {
            panic!("expected StructDeclaration")
        };
        assert_eq!(decl.type_name, "Point");
        assert!(matches!(&*decl.value.borrow(), Node::Dictionary(_)));
    }
}
