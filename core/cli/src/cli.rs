//! Command line argument parsing for the Theta compiler.
//!
//! This module defines the CLI interface using `clap`. The `Cli` struct captures all
//! command line flags and arguments passed to the `thetac` binary.

use std::path::PathBuf;

use clap::Parser;

/// Command line interface definition for the Theta compiler.
///
/// With a source file given, `thetac` compiles it to a WebAssembly module. With no
/// file argument, it starts an interactive REPL that compiles and executes each line
/// of input as it's entered.
#[derive(Parser)]
#[command(
    name = "thetac",
    author,
    version,
    about = "Theta compiler CLI (thetac)",
    long_about = "Compiles a single Theta source file to a WebAssembly module. With no \
file argument, starts an interactive REPL that compiles and executes each input."
)]
pub(crate) struct Cli {
    /// Source file to compile. Omit to start the REPL.
    pub(crate) path: Option<PathBuf>,

    /// Override the output path. Defaults to the source path with its extension
    /// replaced by `.wasm`.
    #[clap(short = 'o', long = "output")]
    pub(crate) output: Option<PathBuf>,

    /// Print every token the lexer produced, before parsing.
    #[clap(long = "emitTokens", action = clap::ArgAction::SetTrue)]
    pub(crate) emit_tokens: bool,

    /// Pretty-print the parsed and optimized AST.
    #[clap(long = "emitAST", action = clap::ArgAction::SetTrue)]
    pub(crate) emit_ast: bool,

    /// Print the compiled module's WebAssembly text format.
    #[clap(long = "emitWAT", action = clap::ArgAction::SetTrue)]
    pub(crate) emit_wat: bool,
}
