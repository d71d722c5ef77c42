//! WebAssembly Code Generator
//!
//! Lowers a type-checked Theta AST straight to a WebAssembly binary module via
//! `wasm-encoder`, rather than through an LLVM intermediate representation. Numbers
//! compile to `i64`, Booleans to `i32`, and Strings to `i32` pointers into a linear
//! memory region of length-prefixed byte blobs (see `module` for the concrete layout
//! and DESIGN.md for why — no stabilized `stringref` encoding exists in the vendored
//! `wasm-encoder`).
//!
//! ## Entry point
//!
//! [`codegen`] takes the parsed-and-optimized AST alongside the [`TypeTable`] produced
//! by `theta_type_checker::check` and returns a finished `.wasm` module as bytes.
#![warn(clippy::pedantic)]

mod codegen;
mod mangle;
mod module;

pub use codegen::CodegenError;
use theta_ast::nodes::Node;
use theta_type_checker::TypeTable;

/// Generates a WebAssembly module from a type-checked AST.
///
/// # Errors
///
/// Returns an error if the program uses a type or construct with no WebAssembly
/// lowering (composite types, a lambda bound to a local, an unresolved reference), or
/// if the top-level value is neither a capsule nor a single expression.
pub fn codegen(ast: &Node, types: &TypeTable) -> anyhow::Result<Vec<u8>> {
    Ok(codegen::emit_module(ast, types)?)
}
