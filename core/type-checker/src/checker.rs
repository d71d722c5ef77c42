//! Bottom-up structural type checker, grounded on SPEC_FULL.md §4.5 and
//! `original_source/src/compiler/TypeChecker.cpp`'s traversal order.

use rustc_hash::FxHashMap;

use theta_ast::diagnostic::{DiagnosticKind, DiagnosticSink};
use theta_ast::nodes::{Node, NodeId, TypeName};
use theta_ast::scope::ScopeStack;

use crate::types::{boolean, describe, fold_variadic, leaf, number, types_equal, unit};

/// Unwraps a `Function<Arg, Ret>` declared type to its return slot `Ret` (the last
/// generic argument), matching `FunctionDeclaration`'s own resolved type, which is its
/// body's type rather than a `Function<...>` composite. Any other declared type is
/// returned unchanged.
fn function_return_slot(declared: &Node) -> &Node {
    if let Node::TypeDeclaration(t) = declared {
        if t.name == TypeName::Function {
            if let Some(last) = t.elements.last() {
                return last;
            }
        }
    }
    declared
}

/// Maps every type-checked node's id to its resolved `TypeDeclaration`. A side table
/// rather than a field on every node — see DESIGN.md Open Question 2.
pub type TypeTable = FxHashMap<NodeId, Node>;

const COMPARISON_OPERATORS: &[&str] = &["==", "!=", "<", ">", "<=", ">=", "&&", "||"];

#[derive(Default)]
pub struct TypeChecker {
    scope: ScopeStack<Node>,
    types: TypeTable,
}

/// Type-checks `ast`, returning whether the program is well-typed and the resolved-type
/// side table. Diagnostics accumulate in `diagnostics` regardless of the returned bool
/// (SPEC_FULL.md §4.5 Contract).
#[must_use]
pub fn check(ast: &Node, diagnostics: &mut DiagnosticSink) -> (bool, TypeTable) {
    let mut checker = TypeChecker::default();
    let ok = checker.check_node(ast, diagnostics).is_some();
    (ok, checker.types)
}

impl TypeChecker {
    fn record(&mut self, id: NodeId, ty: Node) -> Node {
        self.types.insert(id, ty.clone());
        ty
    }

    fn check_node(&mut self, node: &Node, diagnostics: &mut DiagnosticSink) -> Option<Node> {
        match node {
            Node::Source(s) => {
                let value = s.value.borrow().clone();
                let ty = match value {
                    Some(v) => self.check_node(&v, diagnostics)?,
                    None => unit(s.location),
                };
                Some(self.record(s.id, ty))
            }
            Node::Link(l) => {
                let value = l.value.borrow().clone();
                let ty = match value {
                    Some(v) => self.check_node(&v, diagnostics).unwrap_or_else(|| unit(l.location)),
                    None => unit(l.location),
                };
                Some(self.record(l.id, ty))
            }
            Node::Capsule(c) => {
                self.scope.enter_scope();
                let elements = c.elements.borrow().clone();
                self.predeclare_functions(&elements);
                let mut ok = true;
                for element in &elements {
                    if self.check_node(element, diagnostics).is_none() {
                        ok = false;
                    }
                }
                self.scope.exit_scope();
                let ty = leaf(TypeName::Capsule, c.location);
                self.types.insert(c.id, ty.clone());
                ok.then_some(ty)
            }
            Node::Block(b) => {
                self.scope.enter_scope();
                let statements = b.statements.borrow().clone();
                let mut ok = true;
                for statement in &statements {
                    if self.check_node(statement, diagnostics).is_none() {
                        ok = false;
                    }
                }
                self.scope.exit_scope();
                if !ok {
                    return None;
                }
                let mut collected = Vec::new();
                for statement in &statements {
                    self.gather_returns(statement, &mut collected);
                }
                if let Some(last) = statements.last() {
                    if let Some(ty) = self.types.get(&last.id()) {
                        collected.push(ty.clone());
                    }
                }
                let ty = fold_variadic(collected, b.location);
                Some(self.record(b.id, ty))
            }
            Node::AstNodeList(l) => {
                let elements = l.elements.borrow().clone();
                let mut types = Vec::with_capacity(elements.len());
                for e in &elements {
                    types.push(self.check_node(e, diagnostics)?);
                }
                let ty = crate::types::composite(TypeName::Tuple, String::new(), types, l.location);
                Some(self.record(l.id, ty))
            }
            Node::Assignment(a) => {
                let right_ty = self.check_node(&a.right.borrow().clone(), diagnostics)?;
                let left = a.left.borrow().clone();
                let name = left.as_identifier().map(|i| i.name.clone());
                let declared = left.as_identifier().and_then(|i| i.value.borrow().clone());
                let (recorded_ty, scope_ty) = match declared {
                    Some(declared_ty) => {
                        // A `FunctionDeclaration`'s own resolved type is its body's return
                        // type, not a `Function<...>` composite, so a `Function<Arg,
                        // Ret>`-declared left-hand side is checked against `Ret` (its last
                        // element) rather than against the whole composite.
                        let expected = function_return_slot(&declared_ty).clone();
                        if !types_equal(&expected, &right_ty) {
                            diagnostics.report(
                                DiagnosticKind::TypeError,
                                format!(
                                    "cannot assign {} to `{}`, declared as {}",
                                    describe(&right_ty),
                                    name.as_deref().unwrap_or("<non-identifier>"),
                                    describe(&declared_ty)
                                ),
                                Some(a.location),
                            );
                            return None;
                        }
                        (declared_ty, expected)
                    }
                    None => (right_ty.clone(), right_ty),
                };
                if let Some(name) = name {
                    // Overwrites rather than insert-if-absent: refines the `Number`
                    // placeholder `predeclare_functions` seeds for recursive calls. Bound
                    // to `scope_ty` (the callable's effective return type) rather than
                    // `recorded_ty`, so a later reference resolves to a leaf type codegen
                    // can lower, not the full `Function<...>` declaration.
                    self.scope.set(name, scope_ty);
                }
                Some(self.record(a.id, recorded_ty))
            }
            Node::Identifier(ident) => match self.scope.lookup(&ident.name) {
                Some(ty) => Some(self.record(ident.id, ty)),
                None => {
                    diagnostics.report(
                        DiagnosticKind::ReferenceError,
                        format!("undefined reference to `{}`", ident.name),
                        Some(ident.location),
                    );
                    None
                }
            },
            Node::TypeDeclaration(_) => Some(node.clone()),
            Node::FunctionDeclaration(f) => {
                self.scope.enter_scope();
                for param in &f.params {
                    if let Node::Identifier(p) = param {
                        let declared = p.value.borrow().clone();
                        self.scope.insert(p.name.clone(), declared.unwrap_or_else(|| number(p.location)));
                    }
                }
                let body_ty = self.check_node(&f.definition.borrow().clone(), diagnostics);
                self.scope.exit_scope();
                let ty = body_ty?;
                Some(self.record(f.id, ty))
            }
            Node::FunctionInvocation(inv) => {
                let callee_ty = self.check_node(&inv.callee.borrow().clone(), diagnostics)?;
                let mut ok = true;
                for arg in inv.arguments.borrow().iter() {
                    if self.check_node(arg, diagnostics).is_none() {
                        ok = false;
                    }
                }
                ok.then(|| self.record(inv.id, callee_ty))
            }
            Node::Return(r) => {
                let ty = self.check_node(&r.value.borrow().clone(), diagnostics)?;
                Some(self.record(r.id, ty))
            }
            Node::ControlFlow(cf) => {
                let branches = cf.branches.borrow().clone();
                let mut ok = true;
                let mut body_types = Vec::new();
                for branch in &branches {
                    if let Some(cond) = &branch.condition {
                        match self.check_node(cond, diagnostics) {
                            Some(ty) if types_equal(&ty, &boolean(cf.location)) => {}
                            Some(ty) => {
                                diagnostics.report(
                                    DiagnosticKind::TypeError,
                                    format!("if-condition must be Boolean, found {}", describe(&ty)),
                                    Some(cond.location()),
                                );
                                ok = false;
                            }
                            None => ok = false,
                        }
                    }
                    match self.check_node(&branch.body, diagnostics) {
                        Some(ty) => body_types.push(ty),
                        None => ok = false,
                    }
                }
                if !ok {
                    return None;
                }
                let ty = fold_variadic(body_types, cf.location);
                Some(self.record(cf.id, ty))
            }
            Node::BinaryOperation(b) => {
                let left_ty = self.check_node(&b.left.borrow().clone(), diagnostics)?;
                let right_ty = self.check_node(&b.right.borrow().clone(), diagnostics)?;
                if !types_equal(&left_ty, &right_ty) {
                    diagnostics.report(
                        DiagnosticKind::TypeError,
                        format!(
                            "operator `{}` requires operands of the same type, found {} and {}",
                            b.operator,
                            describe(&left_ty),
                            describe(&right_ty)
                        ),
                        Some(b.location),
                    );
                    return None;
                }
                let ty = if COMPARISON_OPERATORS.contains(&b.operator.as_str()) {
                    boolean(b.location)
                } else {
                    left_ty
                };
                Some(self.record(b.id, ty))
            }
            Node::UnaryOperation(u) => {
                let ty = self.check_node(&u.value.borrow().clone(), diagnostics)?;
                Some(self.record(u.id, ty))
            }
            Node::NumberLiteral(n) => Some(self.record(n.id, number(n.location))),
            Node::StringLiteral(s) => Some(self.record(s.id, leaf(TypeName::String, s.location))),
            Node::BooleanLiteral(b) => Some(self.record(b.id, boolean(b.location))),
            Node::Symbol(s) => Some(self.record(s.id, leaf(TypeName::Symbol, s.location))),
            Node::List(l) => {
                let elements = l.elements.borrow().clone();
                if elements.is_empty() {
                    let ty = crate::types::composite(TypeName::List, String::new(), vec![number(l.location)], l.location);
                    return Some(self.record(l.id, ty));
                }
                let mut elem_types = Vec::with_capacity(elements.len());
                for e in &elements {
                    elem_types.push(self.check_node(e, diagnostics)?);
                }
                let first = elem_types[0].clone();
                if elem_types.iter().any(|t| !types_equal(t, &first)) {
                    diagnostics.report(
                        DiagnosticKind::TypeError,
                        "list elements must share a single type",
                        Some(l.location),
                    );
                    return None;
                }
                let ty = crate::types::composite(TypeName::List, String::new(), vec![first], l.location);
                Some(self.record(l.id, ty))
            }
            Node::Tuple(t) => {
                let elements = t.elements.borrow().clone();
                let mut elem_types = Vec::with_capacity(elements.len());
                for e in &elements {
                    elem_types.push(self.check_node(e, diagnostics)?);
                }
                let ty = crate::types::composite(TypeName::Tuple, String::new(), elem_types, t.location);
                Some(self.record(t.id, ty))
            }
            Node::Dictionary(d) => {
                let entries = d.elements.borrow().clone();
                let mut value_types = Vec::with_capacity(entries.len());
                for entry in &entries {
                    let Node::Tuple(pair) = entry else { continue };
                    let elements = pair.elements.borrow();
                    if let Some(value) = elements.get(1) {
                        value_types.push(self.check_node(value, diagnostics)?);
                    }
                }
                let value_ty = if value_types.is_empty() {
                    number(d.location)
                } else {
                    let first = value_types[0].clone();
                    if value_types.iter().any(|t| !types_equal(t, &first)) {
                        diagnostics.report(
                            DiagnosticKind::TypeError,
                            "dictionary values must share a single type",
                            Some(d.location),
                        );
                        return None;
                    }
                    first
                };
                let ty = crate::types::composite(
                    TypeName::Dict,
                    String::new(),
                    vec![leaf(TypeName::Symbol, d.location), value_ty],
                    d.location,
                );
                Some(self.record(d.id, ty))
            }
            Node::Enum(e) => Some(self.record(e.id, unit(e.location))),
            Node::StructDefinition(sd) => {
                let ty = crate::types::composite(TypeName::Struct, sd.name.clone(), Vec::new(), sd.location);
                Some(self.record(sd.id, ty))
            }
            Node::StructDeclaration(sd) => {
                self.check_node(&sd.value.borrow().clone(), diagnostics)?;
                let ty = crate::types::composite(TypeName::Struct, sd.type_name.clone(), Vec::new(), sd.location);
                Some(self.record(sd.id, ty))
            }
        }
    }

    /// Pre-binds every capsule-level `name = (...) -> ...` function to a `Number`
    /// placeholder return type before checking any body, so self- and forward-recursive
    /// calls resolve. `Assignment` overwrites the placeholder with the body's actual
    /// inferred type once checked — see DESIGN.md Open Question: recursive function
    /// typing.
    fn predeclare_functions(&mut self, elements: &[Node]) {
        for element in elements {
            let Node::Assignment(a) = element else { continue };
            if !matches!(&*a.right.borrow(), Node::FunctionDeclaration(_)) {
                continue;
            }
            if let Some(name) = a.left.borrow().as_identifier().map(|i| i.name.clone()) {
                self.scope.insert(name, number(a.location));
            }
        }
    }

    /// Collects the resolved types of every `Return` reachable from `node` without
    /// descending into a nested function body (SPEC_FULL.md §4.5 Block).
    fn gather_returns(&self, node: &Node, acc: &mut Vec<Node>) {
        match node {
            Node::Return(r) => {
                if let Some(ty) = self.types.get(&r.id) {
                    acc.push(ty.clone());
                }
            }
            Node::Block(b) => {
                for s in b.statements.borrow().iter() {
                    self.gather_returns(s, acc);
                }
            }
            Node::ControlFlow(cf) => {
                for branch in cf.branches.borrow().iter() {
                    self.gather_returns(&branch.body, acc);
                }
            }
            _ => {}
        }
    }
}
