//! Ambient-stack properties: the `Compilation` value never leaks state across runs.

use theta_ast::diagnostic::DiagnosticKind;
use theta_compiler::Compilation;

#[test]
fn default_compilation_starts_empty() {
    let compilation = Compilation::default();
    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.capsule_map.is_empty());
}

#[test]
fn independently_constructed_compilations_never_share_diagnostics() {
    let mut a = Compilation::default();
    let b = Compilation::default();
    a.diagnostics.report(DiagnosticKind::IntegrityError, "only in a", None);
    assert!(!a.diagnostics.is_empty());
    assert!(b.diagnostics.is_empty());
}

#[test]
fn clearing_diagnostics_between_runs_yields_consistent_results() {
    let mut compilation = Compilation::default();

    let first = theta_compiler::compile(&mut compilation, "capsule T { main = () -> 1 + 'x' }")
        .expect("no plumbing error");
    assert!(first.is_none());
    let first_diagnostics: Vec<_> = compilation.diagnostics.as_slice().to_vec();

    compilation.clear_diagnostics();
    assert!(compilation.diagnostics.is_empty());

    let second = theta_compiler::compile(&mut compilation, "capsule T { main = () -> 1 + 'x' }")
        .expect("no plumbing error");
    assert!(second.is_none());
    let second_diagnostics: Vec<_> = compilation.diagnostics.as_slice().to_vec();

    assert_eq!(first_diagnostics.len(), second_diagnostics.len());
    for (a, b) in first_diagnostics.iter().zip(second_diagnostics.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message);
    }
}
