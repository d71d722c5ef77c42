//! Shared compile/execute helpers for the end-to-end and property tests.

use theta_ast::diagnostic::DiagnosticSink;
use theta_ast::nodes::Node;
use wasmtime::{Engine, Instance, Module, Store, Val};

/// Lexes, parses, optimizes, and type-checks `source`, panicking with the accumulated
/// diagnostics on any failure. Returns the checked AST and its type table, ready for
/// `theta_wasm_codegen::codegen`.
pub(crate) fn checked(source: &str) -> (Node, theta_type_checker::TypeTable) {
    let tokens = theta_lexer::lex(source);
    let (ast, diagnostics) = theta_parser::parse(tokens);
    assert!(diagnostics.is_empty(), "parse failed: {:?}", diagnostics.as_slice());

    let mut diagnostics = diagnostics;
    theta_optimizer::optimize(&ast, &mut diagnostics);
    assert!(diagnostics.is_empty(), "optimize failed: {:?}", diagnostics.as_slice());

    let (ok, types) = theta_type_checker::check(&ast, &mut diagnostics);
    assert!(ok && diagnostics.is_empty(), "type check failed: {:?}", diagnostics.as_slice());

    (ast, types)
}

/// Runs `source` all the way through codegen, panicking on any diagnostic or codegen
/// error.
pub(crate) fn wasm_codegen(source: &str) -> Vec<u8> {
    let (ast, types) = checked(source);
    theta_wasm_codegen::codegen(&ast, &types).expect("codegen failed")
}

/// Runs `source` through the full pipeline via `theta_compiler::compile`, returning
/// `None` (with the compilation's diagnostics available on the returned sink) instead
/// of panicking on a diagnostic, unlike [`wasm_codegen`].
pub(crate) fn compile_collecting_diagnostics(source: &str) -> (Option<Vec<u8>>, DiagnosticSink) {
    let mut compilation = theta_compiler::Compilation::default();
    let result = theta_compiler::compile(&mut compilation, source).expect("no plumbing error");
    (result, compilation.diagnostics)
}

/// Instantiates `wasm` and calls its first callable export with no arguments,
/// returning the single i64 result. Every end-to-end scenario this drives is a
/// zero-argument function returning one integer.
pub(crate) fn run_and_get_i64(wasm: &[u8]) -> i64 {
    let engine = Engine::default();
    let module = Module::new(&engine, wasm).expect("module should validate");
    let mut store = Store::new(&engine, ());
    let instance = Instance::new(&mut store, &module, &[]).expect("module should instantiate with no imports");

    let export_name = module
        .exports()
        .find(|export| export.ty().func().is_some())
        .map(|export| export.name().to_string())
        .expect("module exports at least one function");

    let func = instance
        .get_func(&mut store, &export_name)
        .expect("export name was just read from this same module");

    let mut results = vec![Val::I64(0); func.ty(&store).results().len()];
    func.call(&mut store, &[], &mut results).expect("execution should not trap");

    match results.first().expect("function returns one value") {
        Val::I64(v) => *v,
        Val::I32(v) => i64::from(*v),
        other => panic!("unexpected result type: {other:?}"),
    }
}

pub(crate) fn compile_and_run(source: &str) -> i64 {
    run_and_get_i64(&wasm_codegen(source))
}
