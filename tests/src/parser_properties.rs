//! Parser properties (SPEC_FULL.md §8).

use theta_ast::nodes::{Node, TypeName};

fn parse_clean(source: &str) -> Node {
    let (ast, diagnostics) = theta_parser::parse(theta_lexer::lex(source));
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics.as_slice());
    ast
}

fn top_level_expression(source: &str) -> Node {
    let Node::Source(source_node) = parse_clean(source) else {
        panic!("expected a Source node");
    };
    source_node.value.borrow().clone().expect("a top-level value")
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = top_level_expression("a + b * c");
    let Node::BinaryOperation(add) = expr else {
        panic!("expected a top-level BinaryOperation");
    };
    assert_eq!(add.operator, "+");
    let right = add.right.borrow().clone();
    assert!(matches!(right, Node::BinaryOperation(_)), "right side should be the `b * c` grouping");
}

#[test]
fn braces_with_a_colon_pair_parse_as_a_dictionary() {
    let expr = top_level_expression("{ :ok: 'x' }");
    assert!(matches!(expr, Node::Dictionary(_)));
}

#[test]
fn braces_with_a_bare_expression_parse_as_a_block() {
    let expr = top_level_expression("{ 1 + 2 }");
    assert!(matches!(expr, Node::Block(_)));
}

#[test]
fn an_identifier_followed_by_a_generic_annotation_binds_its_declared_type() {
    let expr = top_level_expression("x<Number>");
    let Node::Identifier(ident) = expr else {
        panic!("expected a top-level Identifier");
    };
    let declared = ident.value.borrow().clone().expect("a declared type");
    let Node::TypeDeclaration(t) = declared else {
        panic!("expected a TypeDeclaration");
    };
    assert_eq!(t.name, TypeName::Number);
}

#[test]
fn a_function_type_annotation_nests_its_argument_and_return_types() {
    let expr = top_level_expression("double<Function<Number,Number>>");
    let Node::Identifier(ident) = expr else {
        panic!("expected a top-level Identifier");
    };
    let declared = ident.value.borrow().clone().expect("a declared type");
    let Node::TypeDeclaration(t) = declared else {
        panic!("expected a TypeDeclaration");
    };
    assert_eq!(t.name, TypeName::Function);
    assert_eq!(t.elements.len(), 2);
}
