#![warn(clippy::pedantic)]

pub mod literal_inliner;
pub mod pass;

pub use literal_inliner::LiteralInlinerPass;
pub use pass::{run_passes, OptimizationPass};

use theta_ast::diagnostic::DiagnosticSink;
use theta_ast::nodes::Node;

/// Runs the fixed-order optimizer pipeline (currently: literal-inliner/enum-unpacker)
/// over `ast` in place.
pub fn optimize(ast: &Node, diagnostics: &mut DiagnosticSink) {
    let mut passes: Vec<Box<dyn OptimizationPass>> = vec![Box::new(LiteralInlinerPass::new())];
    run_passes(ast, &mut passes, diagnostics);
}
