use theta_ast::diagnostic::DiagnosticSink;
use theta_ast::nodes::Node;
use theta_ast::scope::ScopeStack;

/// A single AST-rewriting optimization pass, grounded on
/// `original_source/src/compiler/optimization/OptimizationPass.cpp`'s traversal
/// skeleton: scope push/pop on scope-introducing nodes, a hoist hook fired on entering a
/// `Capsule`, and a per-node rewrite hook fired post-order.
pub trait OptimizationPass {
    fn name(&self) -> &'static str;

    /// Rewrites `node` in place (returning the possibly-replaced node), or returns `None`
    /// to signal that `node` should be dropped from its containing element list. Only
    /// meaningful for nodes that are themselves elements of a list (capsule/block
    /// bodies); returning `None` for anything else is a logic error in the pass.
    fn visit(&mut self, node: Node, scope: &mut ScopeStack<Node>, diagnostics: &mut DiagnosticSink) -> Option<Node>;
}

/// Runs every pass, in order, over `ast`. Stops (without running later passes) as soon
/// as a pass leaves the diagnostic sink non-empty, matching SPEC_FULL.md §4.4's
/// "aborts the pipeline if any diagnostic was produced by that pass".
pub fn run_passes(ast: &Node, passes: &mut [Box<dyn OptimizationPass>], diagnostics: &mut DiagnosticSink) {
    for pass in passes.iter_mut() {
        let before = diagnostics.len();
        let mut scope = ScopeStack::new();
        log::debug!("running optimization pass `{}`", pass.name());
        pass.visit(ast.clone(), &mut scope, diagnostics);
        if diagnostics.len() > before {
            log::warn!("optimization pass `{}` produced diagnostics; aborting optimizer", pass.name());
            break;
        }
    }
}
