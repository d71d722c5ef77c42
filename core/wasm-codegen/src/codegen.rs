//! Recursive WebAssembly emission, grounded on
//! `original_source/src/compiler/CodeGen.cpp` (dispatch/scoping/mangling/operator
//! lowering) and SPEC_FULL.md §4.6.

use rustc_hash::FxHashMap;
use wasm_encoder::{BlockType, Function, Instruction as I, ValType};

use theta_ast::nodes::{ControlFlowBranch, Node, NodeId, TypeName};
use theta_type_checker::TypeTable;

use crate::mangle::{leaf_type_name, mangle};
use crate::module::{wasm_value_type, ModuleBuilder};

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("type `{0}` has no WebAssembly representation yet")]
    UnsupportedType(String),
    #[error("a function declared as the right-hand side of a local assignment is not codegen-supported")]
    LambdaAssignment,
    #[error("no function named `{0}` matches the given argument types")]
    UnknownFunction(String),
    #[error("reference to `{0}` did not resolve to a local during code generation")]
    UnboundIdentifier(String),
    #[error("top-level value is not a capsule and not a single expression")]
    EmptyProgram,
}

type CgResult<T> = Result<T, CodegenError>;

/// Read-only context threaded through one module's worth of emission: the module's
/// function namespace, the type-checker's resolved-type side table, and the string
/// literals interned up front (`ModuleBuilder::intern_string` needs `&mut self`, so
/// every literal is interned before any function body is emitted — see
/// `collect_strings`).
struct Ctx<'a> {
    module: &'a ModuleBuilder,
    types: &'a TypeTable,
    strings: &'a FxHashMap<NodeId, i32>,
}

/// Emits a full module from a parsed, optimized, type-checked source AST.
pub fn emit_module(ast: &Node, types: &TypeTable) -> CgResult<Vec<u8>> {
    let mut module = ModuleBuilder::new();
    let Node::Source(source) = ast else {
        return Err(CodegenError::EmptyProgram);
    };
    let value = source.value.borrow().clone();
    let root = value.ok_or(CodegenError::EmptyProgram)?;

    let mut strings = FxHashMap::default();
    collect_strings(&root, &mut module, &mut strings);

    match &root {
        Node::Capsule(capsule) => {
            let elements = capsule.elements.borrow().clone();
            emit_capsule(&mut module, &elements, types, &strings)?;
        }
        other => emit_top_level_expression(&mut module, other, types, &strings)?,
    }
    module.finish()
}

/// Interns every string literal reachable from `node`, not descending into nested
/// function bodies any differently than top-level ones — every literal in the program
/// is collected once, regardless of where it appears.
fn collect_strings(node: &Node, module: &mut ModuleBuilder, out: &mut FxHashMap<NodeId, i32>) {
    if let Node::StringLiteral(s) = node {
        let ptr = module.intern_string(&s.value);
        out.insert(s.id, ptr);
        return;
    }
    for child in node.children() {
        collect_strings(&child, module, out);
    }
}

fn result_type_of(node_id: NodeId, types: &TypeTable) -> CgResult<Option<ValType>> {
    let Some(ty) = types.get(&node_id) else {
        return Ok(None);
    };
    if is_unit(ty) {
        return Ok(None);
    }
    let name = leaf_type_name(ty).ok_or_else(|| CodegenError::UnsupportedType("<non-leaf>".to_string()))?;
    wasm_value_type(name)
        .map(Some)
        .ok_or_else(|| CodegenError::UnsupportedType(name.to_string()))
}

fn is_unit(ty: &Node) -> bool {
    matches!(ty, Node::TypeDeclaration(t) if t.name == TypeName::Tuple && t.elements.is_empty())
}

/// A parameter's declared leaf type, defaulting to `Number` for an un-annotated
/// parameter (SPEC_FULL.md §4.2).
fn param_type_name(param: &Node) -> TypeName {
    if let Node::Identifier(p) = param {
        if let Some(ty) = p.value.borrow().clone() {
            if let Some(name) = leaf_type_name(&ty) {
                return name;
            }
        }
    }
    TypeName::Number
}

/// Binds every function-typed capsule element into the module's namespace before
/// emitting any body, so mutual and forward recursion resolve (SPEC_FULL.md §4.6
/// "Capsule handling").
fn emit_capsule(
    module: &mut ModuleBuilder,
    elements: &[Node],
    types: &TypeTable,
    strings: &FxHashMap<NodeId, i32>,
) -> CgResult<()> {
    let mut declarations = Vec::new();
    for element in elements {
        let Node::Assignment(a) = element else { continue };
        let Node::FunctionDeclaration(func) = &*a.right.borrow() else { continue };
        let Some(name) = a.left.borrow().as_identifier().map(|i| i.name.clone()) else { continue };
        let param_types: Vec<TypeName> = func.params.iter().map(param_type_name).collect();
        let mangled = mangle(&name, &param_types);
        let param_valtypes: Vec<ValType> = param_types
            .iter()
            .map(|t| wasm_value_type(*t).ok_or_else(|| CodegenError::UnsupportedType(t.to_string())))
            .collect::<CgResult<Vec<_>>>()?;
        let result = result_type_of(func.id, types)?;
        module.declare_function(mangled.clone(), &param_valtypes, result, TypeName::Number, true, &mangled);
        declarations.push(func.clone());
    }
    for func in declarations {
        let ctx = Ctx { module, types, strings };
        let body = emit_function_body(&func, &ctx)?;
        module.push_body(&body);
    }
    Ok(())
}

/// A file whose top-level value is a bare expression (no capsule) compiles to a single
/// zero-argument exported `main`.
fn emit_top_level_expression(
    module: &mut ModuleBuilder,
    expr: &Node,
    types: &TypeTable,
    strings: &FxHashMap<NodeId, i32>,
) -> CgResult<()> {
    let result = result_type_of(expr.id(), types)?;
    module.declare_function("main".to_string(), &[], result, TypeName::Number, true, "main");
    let mut locals_plan = Vec::new();
    plan_locals(expr, types, &mut locals_plan)?;
    let mut f = Function::new(locals_plan.into_iter().map(|t| (1, t)));
    let mut binder = LocalBinder::new(0);
    let ctx = Ctx { module, types, strings };
    emit_statement(&mut f, expr, true, &ctx, &mut binder)?;
    f.instruction(&I::End);
    module.push_body(&f);
    Ok(())
}

fn emit_function_body(func: &theta_ast::nodes::FunctionDeclarationNode, ctx: &Ctx) -> CgResult<Function> {
    let arity = func.params.len() as u32;
    let body = func.definition.borrow().clone();
    let mut locals_plan = Vec::new();
    plan_locals(&body, ctx.types, &mut locals_plan)?;
    let mut f = Function::new(locals_plan.into_iter().map(|t| (1, t)));
    let mut binder = LocalBinder::new(arity);
    for param in &func.params {
        if let Node::Identifier(p) = param {
            let vt = wasm_value_type(param_type_name(param))
                .ok_or_else(|| CodegenError::UnsupportedType(param_type_name(param).to_string()))?;
            binder.bind(p.name.clone(), vt);
        }
    }
    emit_statement(&mut f, &body, true, ctx, &mut binder)?;
    f.instruction(&I::End);
    Ok(f)
}

/// Walks the body collecting the WebAssembly local type of every non-lambda Assignment
/// encountered in emission order, so the function's locals header can be built before
/// any instruction is emitted. Mirrors `emit_block`'s own traversal order exactly.
fn plan_locals(node: &Node, types: &TypeTable, out: &mut Vec<ValType>) -> CgResult<()> {
    match node {
        Node::Block(b) => {
            for statement in b.statements.borrow().iter() {
                plan_locals(statement, types, out)?;
            }
        }
        Node::ControlFlow(cf) => {
            for branch in cf.branches.borrow().iter() {
                plan_locals(&branch.body, types, out)?;
            }
        }
        Node::Assignment(a) => {
            if matches!(&*a.right.borrow(), Node::FunctionDeclaration(_)) {
                return Err(CodegenError::LambdaAssignment);
            }
            let ty = types
                .get(&a.id)
                .and_then(leaf_type_name)
                .and_then(wasm_value_type)
                .ok_or_else(|| CodegenError::UnsupportedType("assignment".to_string()))?;
            out.push(ty);
        }
        _ => {}
    }
    Ok(())
}

/// Tracks name -> (local index, WebAssembly value type) bindings for one function body.
struct LocalBinder {
    bindings: FxHashMap<String, (u32, ValType)>,
    next_index: u32,
}

impl LocalBinder {
    fn new(arity: u32) -> Self {
        Self { bindings: FxHashMap::default(), next_index: arity }
    }

    fn bind(&mut self, name: String, ty: ValType) -> u32 {
        let idx = self.next_index;
        self.next_index += 1;
        self.bindings.insert(name, (idx, ty));
        idx
    }

    fn lookup(&self, name: &str) -> Option<(u32, ValType)> {
        self.bindings.get(name).copied()
    }
}

/// Emits one statement. `is_last` controls whether its value (if any) is left on the
/// stack (the block/function result) or dropped.
fn emit_statement(f: &mut Function, node: &Node, is_last: bool, ctx: &Ctx, binder: &mut LocalBinder) -> CgResult<()> {
    match node {
        Node::Return(r) => {
            emit_expr(f, &r.value.borrow().clone(), ctx, binder)?;
            f.instruction(&I::Return);
        }
        Node::Assignment(a) => {
            emit_expr(f, &a.right.borrow().clone(), ctx, binder)?;
            let ty = ctx
                .types
                .get(&a.id)
                .and_then(leaf_type_name)
                .and_then(wasm_value_type)
                .ok_or_else(|| CodegenError::UnsupportedType("assignment".to_string()))?;
            let name = a
                .left
                .borrow()
                .as_identifier()
                .map(|i| i.name.clone())
                .ok_or_else(|| CodegenError::UnboundIdentifier("<non-identifier assignment target>".to_string()))?;
            let idx = binder.bind(name, ty);
            if is_last {
                f.instruction(&I::LocalTee(idx));
            } else {
                f.instruction(&I::LocalSet(idx));
            }
        }
        Node::ControlFlow(cf) => {
            emit_control_flow(f, cf, ctx, binder)?;
            if !is_last && result_type_of(cf.id, ctx.types)?.is_some() {
                f.instruction(&I::Drop);
            }
        }
        Node::Block(b) => {
            emit_block(f, &b.statements.borrow(), ctx, binder)?;
        }
        other => {
            emit_expr(f, other, ctx, binder)?;
            if !is_last {
                f.instruction(&I::Drop);
            }
        }
    }
    Ok(())
}

fn emit_block(f: &mut Function, statements: &[Node], ctx: &Ctx, binder: &mut LocalBinder) -> CgResult<()> {
    for (i, statement) in statements.iter().enumerate() {
        let is_last = i + 1 == statements.len();
        emit_statement(f, statement, is_last, ctx, binder)?;
    }
    Ok(())
}

fn emit_control_flow(
    f: &mut Function,
    cf: &theta_ast::nodes::ControlFlowNode,
    ctx: &Ctx,
    binder: &mut LocalBinder,
) -> CgResult<()> {
    let block_type = match result_type_of(cf.id, ctx.types)? {
        Some(vt) => BlockType::Result(vt),
        None => BlockType::Empty,
    };
    let branches = cf.branches.borrow().clone();
    emit_branch_chain(f, &branches, 0, block_type, ctx, binder)
}

fn emit_branch_chain(
    f: &mut Function,
    branches: &[ControlFlowBranch],
    index: usize,
    block_type: BlockType,
    ctx: &Ctx,
    binder: &mut LocalBinder,
) -> CgResult<()> {
    let Some(branch) = branches.get(index) else {
        return Ok(());
    };
    match &branch.condition {
        Some(cond) => {
            emit_expr(f, cond, ctx, binder)?;
            f.instruction(&I::If(block_type));
            emit_branch_body(f, &branch.body, ctx, binder)?;
            if index + 1 < branches.len() {
                f.instruction(&I::Else);
                emit_branch_chain(f, branches, index + 1, block_type, ctx, binder)?;
            }
            f.instruction(&I::End);
        }
        None => {
            emit_branch_body(f, &branch.body, ctx, binder)?;
        }
    }
    Ok(())
}

fn emit_branch_body(f: &mut Function, body: &Node, ctx: &Ctx, binder: &mut LocalBinder) -> CgResult<()> {
    match body {
        Node::Block(b) => emit_block(f, &b.statements.borrow(), ctx, binder),
        other => emit_statement(f, other, true, ctx, binder),
    }
}

fn emit_expr(f: &mut Function, node: &Node, ctx: &Ctx, binder: &mut LocalBinder) -> CgResult<()> {
    match node {
        Node::NumberLiteral(n) => {
            f.instruction(&I::I64Const(n.as_i64().unwrap_or(0)));
        }
        Node::BooleanLiteral(b) => {
            f.instruction(&I::I32Const(i32::from(b.value)));
        }
        Node::StringLiteral(s) => {
            let ptr = ctx.strings.get(&s.id).copied().unwrap_or(0);
            f.instruction(&I::I32Const(ptr));
        }
        Node::Identifier(ident) => {
            let (idx, _ty) = binder
                .lookup(&ident.name)
                .ok_or_else(|| CodegenError::UnboundIdentifier(ident.name.clone()))?;
            f.instruction(&I::LocalGet(idx));
        }
        Node::UnaryOperation(u) => {
            emit_expr(f, &u.value.borrow().clone(), ctx, binder)?;
            match u.operator.as_str() {
                "!" => {
                    // Known bug (SPEC_FULL.md §4.6): operand width is wrong for i32
                    // Booleans — preserved rather than fixed.
                    f.instruction(&I::I64Eqz);
                }
                "-" => {
                    f.instruction(&I::I64Const(-1));
                    f.instruction(&I::I64Mul);
                }
                other => return Err(CodegenError::UnsupportedType(format!("unary operator `{other}`"))),
            }
        }
        Node::BinaryOperation(b) => {
            emit_binary_operation(f, b, ctx, binder)?;
        }
        Node::FunctionInvocation(inv) => {
            emit_invocation(f, inv, ctx, binder)?;
        }
        Node::ControlFlow(cf) => {
            emit_control_flow(f, cf, ctx, binder)?;
        }
        Node::Block(b) => {
            emit_block(f, &b.statements.borrow(), ctx, binder)?;
        }
        other => return Err(CodegenError::UnsupportedType(other.kind_name().to_string())),
    }
    Ok(())
}

fn emit_binary_operation(
    f: &mut Function,
    b: &theta_ast::nodes::BinaryOperationNode,
    ctx: &Ctx,
    binder: &mut LocalBinder,
) -> CgResult<()> {
    let left = b.left.borrow().clone();
    let right = b.right.borrow().clone();
    let operand_type = ctx
        .types
        .get(&left.id())
        .and_then(leaf_type_name)
        .ok_or_else(|| CodegenError::UnsupportedType("binary operand".to_string()))?;
    emit_expr(f, &left, ctx, binder)?;
    emit_expr(f, &right, ctx, binder)?;
    match operand_type {
        TypeName::Number => emit_number_operator(f, &b.operator, ctx)?,
        TypeName::Boolean => emit_boolean_operator(f, &b.operator)?,
        TypeName::String => emit_string_operator(f, &b.operator, ctx)?,
        other => return Err(CodegenError::UnsupportedType(other.to_string())),
    }
    Ok(())
}

fn emit_number_operator(f: &mut Function, operator: &str, ctx: &Ctx) -> CgResult<()> {
    match operator {
        "+" => f.instruction(&I::I64Add),
        "-" => f.instruction(&I::I64Sub),
        "*" => f.instruction(&I::I64Mul),
        "/" => f.instruction(&I::I64DivS),
        "**" => f.instruction(&I::Call(ctx.module.pow_index())),
        "==" => f.instruction(&I::I64Eq),
        "!=" => f.instruction(&I::I64Ne),
        "<" => f.instruction(&I::I64LtS),
        ">" => f.instruction(&I::I64GtS),
        "<=" => f.instruction(&I::I64LeS),
        ">=" => f.instruction(&I::I64GeS),
        other => return Err(CodegenError::UnsupportedType(format!("operator `{other}` on Number"))),
    };
    Ok(())
}

fn emit_boolean_operator(f: &mut Function, operator: &str) -> CgResult<()> {
    match operator {
        "&&" => f.instruction(&I::I32And),
        "||" => f.instruction(&I::I32Or),
        "==" => f.instruction(&I::I32Eq),
        "!=" => f.instruction(&I::I32Ne),
        other => return Err(CodegenError::UnsupportedType(format!("operator `{other}` on Boolean"))),
    };
    Ok(())
}

fn emit_string_operator(f: &mut Function, operator: &str, ctx: &Ctx) -> CgResult<()> {
    match operator {
        "+" => f.instruction(&I::Call(ctx.module.string_concat_index())),
        "==" => f.instruction(&I::Call(ctx.module.string_eq_index())),
        "!=" => {
            f.instruction(&I::Call(ctx.module.string_eq_index()));
            f.instruction(&I::I32Eqz)
        }
        other => return Err(CodegenError::UnsupportedType(format!("operator `{other}` on String"))),
    };
    Ok(())
}

fn emit_invocation(
    f: &mut Function,
    inv: &theta_ast::nodes::FunctionInvocationNode,
    ctx: &Ctx,
    binder: &mut LocalBinder,
) -> CgResult<()> {
    let name = inv
        .callee
        .borrow()
        .as_identifier()
        .map(|i| i.name.clone())
        .ok_or_else(|| CodegenError::UnknownFunction("<non-identifier callee>".to_string()))?;
    let arguments = inv.arguments.borrow().clone();
    for arg in &arguments {
        emit_expr(f, arg, ctx, binder)?;
    }
    let arg_types: Vec<TypeName> = arguments
        .iter()
        .map(|arg| {
            ctx.types
                .get(&arg.id())
                .and_then(leaf_type_name)
                .ok_or_else(|| CodegenError::UnsupportedType("argument".to_string()))
        })
        .collect::<CgResult<Vec<_>>>()?;
    let mangled = mangle(&name, &arg_types);
    let (index, _ret) = ctx.module.lookup(&mangled).ok_or_else(|| CodegenError::UnknownFunction(mangled.clone()))?;
    f.instruction(&I::Call(index));
    Ok(())
}
