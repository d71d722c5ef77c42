//! Literal-inliner / enum-unpacker pass, grounded on
//! `original_source/src/compiler/optimization/LiteralInlinerPass.cpp` and SPEC_FULL.md
//! §4.4.
//!
//! Pre-computes identifier-to-literal substitutions so neither the type checker nor the
//! code generator ever needs a runtime lookup for a compile-time constant.

use theta_ast::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use theta_ast::location::Location;
use theta_ast::nodes::{
    BooleanLiteralNode, ControlFlowBranch, Node, NodeList, NumberLiteralNode, StringLiteralNode,
};
use theta_ast::scope::ScopeStack;

use crate::pass::OptimizationPass;

#[derive(Default)]
pub struct LiteralInlinerPass;

impl LiteralInlinerPass {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn bind_or_report(
        &self,
        scope: &mut ScopeStack<Node>,
        diagnostics: &mut DiagnosticSink,
        name: String,
        value: Node,
        location: Location,
    ) {
        if !scope.insert(name.clone(), value) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::IllegalReassignmentError,
                format!("`{name}` is already bound in this scope"),
                Some(location),
            ));
        }
    }

    fn unpack_enum_symbols(
        &self,
        enum_name: &str,
        symbols: &NodeList,
        location: Location,
        scope: &mut ScopeStack<Node>,
        diagnostics: &mut DiagnosticSink,
    ) {
        for (i, symbol) in symbols.iter().enumerate() {
            let Node::Symbol(s) = symbol else { continue };
            let key = format!("{enum_name}.:{}", s.name);
            let literal = Node::NumberLiteral(NumberLiteralNode::new(0, location, i.to_string()));
            self.bind_or_report(scope, diagnostics, key, literal, location);
        }
    }

    /// Hoist hook: called once, right after a `Capsule` pushes its scope, and before the
    /// capsule's elements are visited in order. Returns the elements that survive (enum
    /// definitions and literal top-level assignments are folded into the scope and
    /// dropped here).
    fn hoist_capsule(
        &self,
        elements: NodeList,
        scope: &mut ScopeStack<Node>,
        diagnostics: &mut DiagnosticSink,
    ) -> NodeList {
        let mut kept = Vec::with_capacity(elements.len());
        for element in elements {
            match &element {
                Node::Enum(e) => {
                    self.unpack_enum_symbols(&e.name, &e.symbols, e.location, scope, diagnostics);
                }
                Node::Assignment(a) if a.right.borrow().is_inlinable_literal() => {
                    let right = a.right.borrow().clone();
                    if let Some(name) = a.left.borrow().as_identifier().map(|i| i.name.clone()) {
                        self.bind_or_report(scope, diagnostics, name, right, a.location);
                    } else {
                        kept.push(element);
                    }
                }
                _ => kept.push(element),
            }
        }
        kept
    }

    fn visit_required(&mut self, node: Node, scope: &mut ScopeStack<Node>, diagnostics: &mut DiagnosticSink) -> Node {
        self.visit(node.clone(), scope, diagnostics).unwrap_or(node)
    }

    fn visit_list(&mut self, elements: NodeList, scope: &mut ScopeStack<Node>, diagnostics: &mut DiagnosticSink) -> NodeList {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(rewritten) = self.visit(element, scope, diagnostics) {
                out.push(rewritten);
            }
        }
        out
    }
}

impl OptimizationPass for LiteralInlinerPass {
    fn name(&self) -> &'static str {
        "literal-inliner"
    }

    fn visit(&mut self, node: Node, scope: &mut ScopeStack<Node>, diagnostics: &mut DiagnosticSink) -> Option<Node> {
        match node {
            Node::Source(s) => {
                let value = s.value.borrow().clone();
                if let Some(v) = value {
                    let rewritten = self.visit(v, scope, diagnostics);
                    *s.value.borrow_mut() = rewritten;
                }
                Some(Node::Source(s))
            }
            Node::Capsule(c) => {
                scope.enter_scope();
                let elements = c.elements.borrow().clone();
                let kept = self.hoist_capsule(elements, scope, diagnostics);
                let rewritten = self.visit_list(kept, scope, diagnostics);
                *c.elements.borrow_mut() = rewritten;
                scope.exit_scope();
                Some(Node::Capsule(c))
            }
            Node::Block(b) => {
                scope.enter_scope();
                let statements = b.statements.borrow().clone();
                let rewritten = self.visit_list(statements, scope, diagnostics);
                *b.statements.borrow_mut() = rewritten;
                scope.exit_scope();
                Some(Node::Block(b))
            }
            Node::Assignment(a) => {
                let right = self.visit_required(a.right.borrow().clone(), scope, diagnostics);
                *a.right.borrow_mut() = right.clone();
                let left = self.visit_required(a.left.borrow().clone(), scope, diagnostics);
                *a.left.borrow_mut() = left.clone();
                if right.is_inlinable_literal() {
                    if let Some(name) = left.as_identifier().map(|i| i.name.clone()) {
                        self.bind_or_report(scope, diagnostics, name, right, a.location);
                        return None;
                    }
                }
                Some(Node::Assignment(a))
            }
            Node::Identifier(ident) => {
                if let Some(bound) = scope.lookup(&ident.name) {
                    if bound.is_inlinable_literal() {
                        return Some(relocate(bound, ident.location));
                    }
                }
                Some(Node::Identifier(ident))
            }
            Node::Enum(e) => {
                self.unpack_enum_symbols(&e.name, &e.symbols, e.location, scope, diagnostics);
                None
            }
            Node::Return(r) => {
                let value = self.visit_required(r.value.borrow().clone(), scope, diagnostics);
                *r.value.borrow_mut() = value;
                Some(Node::Return(r))
            }
            Node::FunctionDeclaration(f) => {
                // `definition` is always a Block (the parser wraps bare bodies in a
                // singleton block), which pushes its own scope.
                let definition = self.visit_required(f.definition.borrow().clone(), scope, diagnostics);
                *f.definition.borrow_mut() = definition;
                Some(Node::FunctionDeclaration(f))
            }
            Node::FunctionInvocation(inv) => {
                let callee = self.visit_required(inv.callee.borrow().clone(), scope, diagnostics);
                *inv.callee.borrow_mut() = callee;
                let arguments = inv.arguments.borrow().clone();
                let rewritten = self.visit_list(arguments, scope, diagnostics);
                *inv.arguments.borrow_mut() = rewritten;
                Some(Node::FunctionInvocation(inv))
            }
            Node::BinaryOperation(b) => {
                let left = self.visit_required(b.left.borrow().clone(), scope, diagnostics);
                *b.left.borrow_mut() = left;
                let right = self.visit_required(b.right.borrow().clone(), scope, diagnostics);
                *b.right.borrow_mut() = right;
                Some(Node::BinaryOperation(b))
            }
            Node::UnaryOperation(u) => {
                let value = self.visit_required(u.value.borrow().clone(), scope, diagnostics);
                *u.value.borrow_mut() = value;
                Some(Node::UnaryOperation(u))
            }
            Node::ControlFlow(cf) => {
                let branches = cf.branches.borrow().clone();
                let mut rewritten = Vec::with_capacity(branches.len());
                for branch in branches {
                    let condition = branch
                        .condition
                        .map(|c| self.visit_required(c, scope, diagnostics));
                    let body = self.visit_required(branch.body, scope, diagnostics);
                    rewritten.push(ControlFlowBranch { condition, body });
                }
                *cf.branches.borrow_mut() = rewritten;
                Some(Node::ControlFlow(cf))
            }
            Node::List(l) => {
                let elements = l.elements.borrow().clone();
                let rewritten = self.visit_list(elements, scope, diagnostics);
                *l.elements.borrow_mut() = rewritten;
                Some(Node::List(l))
            }
            Node::Tuple(t) => {
                let elements = t.elements.borrow().clone();
                let rewritten = self.visit_list(elements, scope, diagnostics);
                *t.elements.borrow_mut() = rewritten;
                Some(Node::Tuple(t))
            }
            Node::Dictionary(d) => {
                let elements = d.elements.borrow().clone();
                let rewritten = self.visit_list(elements, scope, diagnostics);
                *d.elements.borrow_mut() = rewritten;
                Some(Node::Dictionary(d))
            }
            Node::AstNodeList(l) => {
                let elements = l.elements.borrow().clone();
                let rewritten = self.visit_list(elements, scope, diagnostics);
                *l.elements.borrow_mut() = rewritten;
                Some(Node::AstNodeList(l))
            }
            Node::StructDeclaration(sd) => {
                let value = self.visit_required(sd.value.borrow().clone(), scope, diagnostics);
                *sd.value.borrow_mut() = value;
                Some(Node::StructDeclaration(sd))
            }
            // Leaves and nodes the pass has nothing to rewrite on.
            leaf @ (Node::Link(_)
            | Node::NumberLiteral(_)
            | Node::StringLiteral(_)
            | Node::BooleanLiteral(_)
            | Node::Symbol(_)
            | Node::TypeDeclaration(_)
            | Node::StructDefinition(_)) => Some(leaf),
        }
    }
}

/// Re-stamps an inlined literal with the location of the identifier it replaced, so
/// diagnostics and codegen spans point at the reference site rather than the original
/// declaration.
fn relocate(node: Node, location: Location) -> Node {
    match node {
        Node::NumberLiteral(n) => Node::NumberLiteral(NumberLiteralNode::new(n.id, location, n.value.clone())),
        Node::StringLiteral(n) => Node::StringLiteral(StringLiteralNode::new(n.id, location, n.value.clone())),
        Node::BooleanLiteral(n) => Node::BooleanLiteral(BooleanLiteralNode::new(n.id, location, n.value)),
        other => other,
    }
}
