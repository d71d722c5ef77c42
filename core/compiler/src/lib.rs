//! Core Orchestration Crate for the Theta Compiler
//!
//! This crate provides the main entry points for the Theta compiler pipeline. It
//! orchestrates compilation from source text to a WebAssembly binary module.
//!
//! ## Overview
//!
//! Theta source compiles through a fixed sequence of phases:
//!
//! ```text
//! source → lex → parse → resolve links → optimize → type check → codegen → .wasm
//! ```
//!
//! Each phase is exposed as a standalone function operating on a [`Compilation`] value,
//! which carries the diagnostic sink, the capsule-name → file-path map, and the
//! resolver's cache of already-parsed capsules — the state the original implementation
//! keeps as process-wide globals (see DESIGN.md). [`compile`] runs every phase in order
//! and aborts early if a phase leaves diagnostics in the sink.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use theta_compiler::{compile, Compilation};
//!
//! let mut compilation = Compilation::default();
//! match compile(&mut compilation, "capsule Main { main = () -> 10 + 5 }") {
//!     Ok(Some(wasm)) => { let _ = wasm; }
//!     Ok(None) => {
//!         for diagnostic in compilation.diagnostics.as_slice() {
//!             eprintln!("{diagnostic}");
//!         }
//!     }
//!     Err(err) => eprintln!("compiler error: {err}"),
//! }
//! ```
//!
//! ## Phases
//!
//! ### Lex + parse
//!
//! [`parse`] tokenizes and parses `source` into a `Source` AST node. `link` declarations
//! produce unresolved `Link` nodes; their targets are not yet read from disk.
//!
//! ### Resolve links
//!
//! [`resolve_links`] walks the AST's top-level link list and, for each, looks up the
//! capsule name in `compilation.capsule_map`, parses the target file, and caches the
//! result so a second reference to the same capsule — including a cyclic one — reuses
//! the cached node instead of re-parsing (SPEC_FULL.md §4.3).
//!
//! ### Optimize
//!
//! [`optimize`] runs the fixed-order optimizer pipeline (currently the literal-inliner /
//! enum-unpacker pass) over the AST in place.
//!
//! ### Type check
//!
//! [`type_check`] traverses the AST bottom-up, attaching a resolved type to every node
//! and returning whether the program is well-typed.
//!
//! ### Codegen
//!
//! [`codegen`] lowers a type-checked AST to a WebAssembly binary module.
//!
//! ## Error handling
//!
//! Diagnostics about the *input program* (syntax errors, type errors, unresolved links,
//! …) accumulate in `compilation.diagnostics`; phase functions never return them as
//! `Err`. Plumbing failures — an unreadable file, a `wasm-encoder` invariant violation —
//! surface as `anyhow::Result` errors instead, exactly as the phases they wrap already
//! report them.
//!
//! ## Logging
//!
//! Every phase logs its entry and diagnostic count at `debug` level via the `log` facade
//! (SPEC_FULL.md §4.8); no log statement sits on a hot per-node path inside the parser or
//! optimizer traversal.

#![warn(clippy::pedantic)]

mod compilation;

pub use compilation::Compilation;
pub use theta_parser::CapsuleMap;

use theta_ast::diagnostic::DiagnosticSink;
use theta_ast::nodes::Node;
use theta_type_checker::TypeTable;

/// Lexes and parses `source`, appending any diagnostics produced to `compilation`.
///
/// `link` declarations are left unresolved; call [`resolve_links`] afterward to populate
/// them.
pub fn parse(compilation: &mut Compilation, source: &str) -> Node {
    log::debug!("parse: lexing {} bytes", source.len());
    let tokens = theta_lexer::lex(source);
    log::debug!("parse: {} tokens", tokens.len());
    let (ast, mut diagnostics) = theta_parser::parse(tokens);
    log::debug!("parse: produced {} diagnostics", diagnostics.len());
    drain_into(&mut compilation.diagnostics, &mut diagnostics);
    ast
}

/// Resolves every `Link` reachable from `ast`'s top-level link list against
/// `compilation.capsule_map`, recursively resolving links transitively reached through
/// linked capsules. A capsule name with no entry in the map produces a `LinkageError`.
pub fn resolve_links(compilation: &mut Compilation, ast: &Node) {
    log::debug!("resolve_links: entering");
    let capsule_map = compilation.capsule_map.clone();
    let mut diagnostics = DiagnosticSink::new();
    compilation
        .resolver_mut()
        .resolve(ast, &capsule_map, &mut diagnostics);
    log::debug!("resolve_links: produced {} diagnostics", diagnostics.len());
    drain_into(&mut compilation.diagnostics, &mut diagnostics);
}

/// Runs the fixed-order optimizer pipeline over `ast` in place.
pub fn optimize(compilation: &mut Compilation, ast: &Node) {
    log::debug!("optimize: entering");
    let mut diagnostics = DiagnosticSink::new();
    theta_optimizer::optimize(ast, &mut diagnostics);
    log::debug!("optimize: produced {} diagnostics", diagnostics.len());
    drain_into(&mut compilation.diagnostics, &mut diagnostics);
}

/// Type-checks `ast`, attaching a resolved type to every reachable node. Returns whether
/// the program is well-typed; the returned [`TypeTable`] is required for [`codegen`]
/// regardless.
pub fn type_check(compilation: &mut Compilation, ast: &Node) -> (bool, TypeTable) {
    log::debug!("type_check: entering");
    let mut diagnostics = DiagnosticSink::new();
    let (ok, types) = theta_type_checker::check(ast, &mut diagnostics);
    log::debug!("type_check: ok={ok}, produced {} diagnostics", diagnostics.len());
    drain_into(&mut compilation.diagnostics, &mut diagnostics);
    (ok, types)
}

/// Generates a WebAssembly module from a type-checked AST.
///
/// # Errors
///
/// Returns an error if the program uses a construct with no WebAssembly lowering (see
/// `theta_wasm_codegen::CodegenError`).
pub fn codegen(ast: &Node, types: &TypeTable) -> anyhow::Result<Vec<u8>> {
    log::debug!("codegen: entering");
    let wasm = theta_wasm_codegen::codegen(ast, types)?;
    log::debug!("codegen: emitted {} bytes", wasm.len());
    Ok(wasm)
}

/// Runs every phase over `source` in order, aborting and returning `Ok(None)` if a phase
/// leaves diagnostics in `compilation`'s sink. On success returns the finished
/// WebAssembly module.
///
/// # Errors
///
/// Returns an error for plumbing failures unrelated to the correctness of `source` (see
/// module docs); program-correctness problems instead accumulate in
/// `compilation.diagnostics` and this function returns `Ok(None)`.
pub fn compile(compilation: &mut Compilation, source: &str) -> anyhow::Result<Option<Vec<u8>>> {
    let ast = parse(compilation, source);
    if !compilation.diagnostics.is_empty() {
        log::debug!("compile: aborting after parse");
        return Ok(None);
    }

    resolve_links(compilation, &ast);
    if !compilation.diagnostics.is_empty() {
        log::debug!("compile: aborting after resolve_links");
        return Ok(None);
    }

    optimize(compilation, &ast);
    if !compilation.diagnostics.is_empty() {
        log::debug!("compile: aborting after optimize");
        return Ok(None);
    }

    let (ok, types) = type_check(compilation, &ast);
    if !ok || !compilation.diagnostics.is_empty() {
        log::debug!("compile: aborting after type_check");
        return Ok(None);
    }

    let wasm = codegen(&ast, &types)?;
    Ok(Some(wasm))
}

fn drain_into(into: &mut DiagnosticSink, from: &mut DiagnosticSink) {
    for diagnostic in from.drain() {
        into.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theta_ast::diagnostic::DiagnosticKind;

    #[test]
    fn compiles_a_trivial_capsule_end_to_end() {
        let mut compilation = Compilation::default();
        let wasm = compile(&mut compilation, "capsule T { main = () -> 10 + 5 }")
            .expect("no plumbing error")
            .expect("no diagnostics");
        assert!(wasm.starts_with(&[0x00, 0x61, 0x73, 0x6d]));
    }

    #[test]
    fn type_error_aborts_before_codegen() {
        let mut compilation = Compilation::default();
        let outcome = compile(&mut compilation, "capsule T { main = () -> 1 + 'x' }").expect("no plumbing error");
        assert!(outcome.is_none());
        assert!(compilation.diagnostics.has_kind(DiagnosticKind::TypeError));
    }

    #[test]
    fn unresolved_link_produces_a_linkage_error() {
        let mut compilation = Compilation::default();
        let outcome = compile(&mut compilation, "link DoesNotExist\ncapsule T { main = () -> 1 }")
            .expect("no plumbing error");
        assert!(outcome.is_none());
        assert!(compilation.diagnostics.has_kind(DiagnosticKind::LinkageError));
    }

    #[test]
    fn clear_diagnostics_allows_the_repl_to_reuse_one_compilation() {
        let mut compilation = Compilation::default();
        compile(&mut compilation, "capsule T { main = () -> 1 + 'x' }").expect("no plumbing error");
        assert!(!compilation.diagnostics.is_empty());

        compilation.clear_diagnostics();
        assert!(compilation.diagnostics.is_empty());

        let wasm = compile(&mut compilation, "capsule T { main = () -> 1 }")
            .expect("no plumbing error")
            .expect("no diagnostics");
        assert!(wasm.starts_with(&[0x00, 0x61, 0x73, 0x6d]));
    }

    #[test]
    fn reassignment_in_the_same_scope_is_an_illegal_reassignment_error() {
        let mut compilation = Compilation::default();
        let outcome = compile(
            &mut compilation,
            "capsule T { x = 0 x = 1 main = () -> x }",
        )
        .expect("no plumbing error");
        assert!(outcome.is_none());
        assert!(compilation.diagnostics.has_kind(DiagnosticKind::IllegalReassignmentError));
    }
}
