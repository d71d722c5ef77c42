#![warn(clippy::pedantic)]

//! # Theta Compiler CLI
//!
//! Command line interface for the Theta toolchain.
//!
//! `thetac <file>` compiles one `.th` source file to a WebAssembly module, written by
//! default alongside the source with its extension replaced by `.wasm` (`-o` overrides
//! the output path). `--emitTokens`, `--emitAST`, and `--emitWAT` dump intermediate
//! compilation forms alongside the normal output. With no file argument, `thetac`
//! starts an interactive REPL (see `repl`).
//!
//! At startup the current working directory is walked recursively for `*.th` files to
//! build the capsule-name → file-path map `link` declarations resolve against
//! (SPEC_FULL.md §6 "Capsule discovery").
//!
//! ## Exit codes
//! * 0 – success, no diagnostics.
//! * 1 – usage error, IO failure, or diagnostics were emitted.

mod cli;
mod diagnostics;
mod repl;

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use cli::Cli;
use theta_compiler::{CapsuleMap, Compilation};
use walkdir::WalkDir;

fn main() {
    env_logger::init();
    let args = Cli::parse();
    let capsule_map = discover_capsules(Path::new("."));

    match &args.path {
        Some(path) => run_file(path, &args, capsule_map),
        None => repl::run(capsule_map),
    }
}

fn run_file(path: &PathBuf, args: &Cli, capsule_map: CapsuleMap) {
    if !path.exists() {
        eprintln!("Error: path not found");
        process::exit(1);
    }

    let source = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("Error reading {}: {err}", path.display());
        process::exit(1);
    });

    let mut compilation = Compilation::new(capsule_map);
    match compile_with_dumps(&source, &mut compilation, args) {
        Ok(Some(wasm)) => {
            let output_path = args.output.clone().unwrap_or_else(|| path.with_extension("wasm"));
            if let Err(err) = fs::write(&output_path, &wasm) {
                eprintln!("Failed to write {}: {err}", output_path.display());
                process::exit(1);
            }
            println!("Compiled {} -> {}", path.display(), output_path.display());
            process::exit(0);
        }
        Ok(None) => {
            for diagnostic in compilation.diagnostics.as_slice() {
                diagnostics::print(&source, diagnostic);
            }
            process::exit(1);
        }
        Err(err) => {
            eprintln!("Compiler error: {err}");
            process::exit(1);
        }
    }
}

/// Runs the pipeline phase-by-phase, rather than through `theta_compiler::compile`, so
/// each `--emit*` flag can hook in at the right point: tokens before parsing, the AST
/// after optimization, WAT after codegen.
fn compile_with_dumps(source: &str, compilation: &mut Compilation, args: &Cli) -> anyhow::Result<Option<Vec<u8>>> {
    if args.emit_tokens {
        for token in theta_lexer::lex(source) {
            println!("{token:?}");
        }
    }

    let ast = theta_compiler::parse(compilation, source);
    if !compilation.diagnostics.is_empty() {
        return Ok(None);
    }

    theta_compiler::resolve_links(compilation, &ast);
    if !compilation.diagnostics.is_empty() {
        return Ok(None);
    }

    theta_compiler::optimize(compilation, &ast);
    if !compilation.diagnostics.is_empty() {
        return Ok(None);
    }

    if args.emit_ast {
        println!("{ast:#?}");
    }

    let (ok, types) = theta_compiler::type_check(compilation, &ast);
    if !ok || !compilation.diagnostics.is_empty() {
        return Ok(None);
    }

    let wasm = theta_compiler::codegen(&ast, &types)?;
    if args.emit_wat {
        println!("{}", wasmprinter::print_bytes(&wasm)?);
    }
    Ok(Some(wasm))
}

fn discover_capsules(root: &Path) -> CapsuleMap {
    let mut map = CapsuleMap::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("th") {
            continue;
        }
        let Ok(text) = fs::read_to_string(entry.path()) else {
            continue;
        };
        if let Some(name) = first_capsule_name(&text) {
            map.insert(name, entry.path().to_path_buf());
        }
    }
    map
}

fn first_capsule_name(text: &str) -> Option<String> {
    let idx = text.find("capsule")?;
    text[idx + "capsule".len()..].split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_capsule_name_reads_the_identifier_after_the_keyword() {
        assert_eq!(first_capsule_name("link Other\ncapsule Main {\n}"), Some("Main".to_string()));
    }

    #[test]
    fn first_capsule_name_is_none_without_the_keyword() {
        assert_eq!(first_capsule_name("1 + 1"), None);
    }
}
