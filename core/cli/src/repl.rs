//! Interactive read-eval-print loop.
//!
//! Accumulates a multi-line buffer while any of `{`, `(`, `[` remain unclosed, then
//! compiles the buffer directly and executes it, printing the result — mirroring
//! `original_source/src/cli/REPL.cpp`'s `readInput`/`execute` pair, but against an
//! embedded `wasmtime` engine instead of the source's own bespoke runtime.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use theta_compiler::{CapsuleMap, Compilation};
use wasmtime::{Engine, Instance, Module, Store, Val};

use crate::diagnostics;

pub(crate) fn run(capsule_map: CapsuleMap) {
    println!("Interactive Theta");
    println!("Ctrl+D to exit");
    println!();

    let mut compilation = Compilation::new(capsule_map);
    let stdin = io::stdin();
    let mut buffer = String::new();
    let mut depth: i32 = 0;

    loop {
        print!("{} ", prompt(depth));
        let _ = io::stdout().flush();

        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line).unwrap_or(0);
        if bytes_read == 0 {
            println!("\nExiting...");
            break;
        }

        depth += bracket_delta(&line);
        buffer.push_str(&line);

        if depth > 0 {
            continue;
        }

        if !buffer.trim().is_empty() {
            evaluate(&mut compilation, buffer.trim_end());
        }
        buffer.clear();
        depth = 0;
    }
}

fn prompt(depth: i32) -> &'static str {
    if depth > 0 {
        "..."
    } else {
        "theta>"
    }
}

fn bracket_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' | '(' | '[' => acc + 1,
        '}' | ')' | ']' => acc - 1,
        _ => acc,
    })
}

fn evaluate(compilation: &mut Compilation, source: &str) {
    match theta_compiler::compile(compilation, source) {
        Ok(Some(wasm)) => execute(&wasm),
        Ok(None) => {
            for diagnostic in compilation.diagnostics.as_slice() {
                diagnostics::print(source, diagnostic);
            }
        }
        Err(err) => eprintln!("compiler error: {err}"),
    }
    compilation.clear_diagnostics();
}

/// Instantiates the compiled module and calls its single callable export with no
/// arguments, printing the result(s). Every end-to-end scenario this REPL is meant to
/// drive interactively is a zero-argument exported function (§8).
fn execute(wasm: &[u8]) {
    let engine = Engine::default();
    let module = match Module::new(&engine, wasm) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("failed to load compiled module: {err}");
            return;
        }
    };
    let mut store = Store::new(&engine, ());
    let instance = match Instance::new(&mut store, &module, &[]) {
        Ok(instance) => instance,
        Err(err) => {
            eprintln!("failed to instantiate compiled module: {err}");
            return;
        }
    };
    let Some(export_name) = first_callable_export(&module) else {
        eprintln!("compiled module exports no callable function");
        return;
    };
    let func = instance
        .get_func(&mut store, &export_name)
        .expect("export name was just read from this same module");

    let mut results = vec![Val::I64(0); func.ty(&store).results().len()];
    if let Err(err) = func.call(&mut store, &[], &mut results) {
        eprintln!("execution trapped: {err}");
        return;
    }

    let rendered: Vec<String> = results.iter().map(render_val).collect();
    println!("{}", format!("-----> {}", rendered.join(", ")).yellow());
}

fn first_callable_export(module: &Module) -> Option<String> {
    module
        .exports()
        .find(|export| export.ty().func().is_some())
        .map(|export| export.name().to_string())
}

fn render_val(value: &Val) -> String {
    match value {
        Val::I32(v) => v.to_string(),
        Val::I64(v) => v.to_string(),
        other => format!("{other:?}"),
    }
}
