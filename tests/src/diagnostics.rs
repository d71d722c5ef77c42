//! The three diagnostic scenarios.

use crate::utils::compile_collecting_diagnostics;
use theta_ast::diagnostic::DiagnosticKind;

#[test]
fn assigning_a_mismatched_value_to_a_declared_type_is_a_type_error() {
    // A bare literal right-hand side (`x<String> = 5`) is hoisted into scope and dropped
    // by the literal-inliner before the type checker ever sees it (it binds by value, not
    // by declared type), so the mismatch is exercised with a non-literal right-hand side
    // instead.
    let (outcome, diagnostics) =
        compile_collecting_diagnostics("capsule T { main<Function<Number>> = () -> { x<String> = 1 + 1 return 0 } }");
    assert!(outcome.is_none());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_kind(DiagnosticKind::TypeError));
}

#[test]
fn reassigning_a_name_already_bound_in_scope_is_an_illegal_reassignment_error() {
    let (outcome, diagnostics) =
        compile_collecting_diagnostics("capsule T { x<Number> = 0 x<Number> = 1 }");
    assert!(outcome.is_none());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_kind(DiagnosticKind::IllegalReassignmentError));
}

#[test]
fn referencing_an_undeclared_name_is_a_reference_error() {
    let (outcome, diagnostics) = compile_collecting_diagnostics("capsule T { main = () -> undefined + 1 }");
    assert!(outcome.is_none());
    assert!(diagnostics.has_kind(DiagnosticKind::ReferenceError));
}
