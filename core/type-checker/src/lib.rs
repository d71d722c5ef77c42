//! Type Checker Crate
//!
//! Structural, bottom-up type checking for the Theta language.
//!
//! ## Entry point
//!
//! ```ignore
//! let (ast, mut diagnostics) = theta_parser::parse(theta_lexer::lex(source));
//! let (well_typed, types) = theta_type_checker::check(&ast, &mut diagnostics);
//! ```
//!
//! Every checked node's resolved type lands in the returned [`TypeTable`], keyed by
//! `NodeId`; diagnostics accumulate in the caller's sink regardless of the returned
//! bool.

#![warn(clippy::pedantic)]

mod checker;
pub mod types;

pub use checker::{check, TypeChecker, TypeTable};

#[cfg(test)]
mod tests {
    use super::*;
    use theta_ast::diagnostic::DiagnosticKind;
    use theta_ast::nodes::Node;

    fn checked(source: &str) -> (bool, theta_ast::diagnostic::DiagnosticSink) {
        let (ast, mut diagnostics) = theta_parser::parse(theta_lexer::lex(source));
        let (ok, _types) = check(&ast, &mut diagnostics);
        (ok, diagnostics)
    }

    #[test]
    fn number_literal_capsule_checks_clean() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> 15 }");
        assert!(ok, "{:?}", diagnostics.as_slice());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn string_and_boolean_literals_check_clean() {
        let (ok, diagnostics) = checked("capsule Main { greet = () -> 'hi' flag = () -> true }");
        assert!(ok, "{:?}", diagnostics.as_slice());
    }

    #[test]
    fn binary_operation_on_mismatched_types_reports_type_error() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> 1 + 'x' }");
        assert!(!ok);
        assert!(diagnostics.has_kind(DiagnosticKind::TypeError));
    }

    #[test]
    fn comparison_operator_yields_boolean() {
        let (ast, mut diagnostics) = theta_parser::parse(theta_lexer::lex(
            "capsule Main { main = () -> 1 < 2 }",
        ));
        let (ok, types) = check(&ast, &mut diagnostics);
        assert!(ok, "{:?}", diagnostics.as_slice());
        let Node::Source(src) = &ast else { panic!() };
        let value = src.value.borrow();
        let Some(Node::Capsule(capsule)) = value.as_ref() else { panic!() };
        let Node::FunctionDeclaration(func) = &capsule.elements.borrow()[0] else { panic!() };
        let func_ty = types.get(&func.id).expect("function type recorded");
        assert_eq!(types::describe(func_ty), "Boolean");
    }

    #[test]
    fn if_condition_must_be_boolean() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> if 1 { 2 } else { 3 } }");
        assert!(!ok);
        assert!(diagnostics.has_kind(DiagnosticKind::TypeError));
    }

    #[test]
    fn branches_of_differing_type_fold_into_variadic() {
        let (ast, mut diagnostics) = theta_parser::parse(theta_lexer::lex(
            "capsule Main { main = () -> if true { 1 } else { 'x' } }",
        ));
        let (ok, types) = check(&ast, &mut diagnostics);
        assert!(ok, "{:?}", diagnostics.as_slice());
        let Node::Source(src) = &ast else { panic!() };
        let value = src.value.borrow();
        let Some(Node::Capsule(capsule)) = value.as_ref() else { panic!() };
        let Node::FunctionDeclaration(func) = &capsule.elements.borrow()[0] else { panic!() };
        let func_ty = types.get(&func.id).expect("function type recorded");
        assert_eq!(types::describe(func_ty), "Variadic<Number, String>");
    }

    #[test]
    fn unbound_identifier_reports_reference_error() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> undeclared }");
        assert!(!ok);
        assert!(diagnostics.has_kind(DiagnosticKind::ReferenceError));
    }

    #[test]
    fn recursive_function_resolves_via_predeclared_placeholder() {
        let (ok, diagnostics) = checked(
            "capsule Main { fib = (n) -> if n <= 1 { n } else { fib(n - 1) + fib(n - 2) } }",
        );
        assert!(ok, "{:?}", diagnostics.as_slice());
    }

    #[test]
    fn list_of_mismatched_element_types_reports_type_error() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> [1, 'x'] }");
        assert!(!ok);
        assert!(diagnostics.has_kind(DiagnosticKind::TypeError));
    }

    #[test]
    fn homogeneous_list_checks_clean() {
        let (ok, diagnostics) = checked("capsule Main { main = () -> [1, 2, 3] }");
        assert!(ok, "{:?}", diagnostics.as_slice());
    }

    #[test]
    fn function_parameter_defaults_to_number() {
        let (ok, diagnostics) = checked("capsule Main { add = (a, b) -> a + b }");
        assert!(ok, "{:?}", diagnostics.as_slice());
    }
}
