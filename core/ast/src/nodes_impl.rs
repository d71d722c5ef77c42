//! Constructors and small query helpers for the node set in `nodes.rs`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::location::Location;
use crate::nodes::{
    AssignmentNode, AstNodeListNode, BinaryOperationNode, BlockNode, BooleanLiteralNode,
    CapsuleNode, ControlFlowBranch, ControlFlowNode, DictionaryNode, EnumNode,
    FunctionDeclarationNode, FunctionInvocationNode, IdentifierNode, LinkNode, ListNode, Node,
    NodeId, NodeList, NumberLiteralNode, ReturnNode, SourceNode, StringLiteralNode,
    StructDeclarationNode, StructDefinitionNode, SymbolNode, TupleNode, TypeDeclarationNode,
    TypeName, UnaryOperationNode,
};

impl SourceNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, links: NodeList, value: Option<Node>) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            links: RefCell::new(links),
            value: RefCell::new(value),
        })
    }
}

impl LinkNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, capsule_name: String, value: Option<Node>) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            capsule_name,
            value: RefCell::new(value),
        })
    }
}

impl CapsuleNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: String, elements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            name,
            elements: RefCell::new(elements),
        })
    }
}

impl BlockNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, statements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            statements: RefCell::new(statements),
        })
    }
}

impl AstNodeListNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, elements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            elements: RefCell::new(elements),
        })
    }
}

impl AssignmentNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, left: Node, right: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            left: RefCell::new(left),
            right: RefCell::new(right),
        })
    }
}

impl IdentifierNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: String, value: Option<Node>) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            name,
            value: RefCell::new(value),
        })
    }
}

impl TypeDeclarationNode {
    #[must_use]
    pub fn new(
        id: NodeId,
        location: Location,
        name: TypeName,
        type_name: String,
        elements: NodeList,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            name,
            type_name,
            elements,
        })
    }

    #[must_use]
    pub fn leaf(id: NodeId, location: Location, name: TypeName) -> Rc<Self> {
        Self::new(id, location, name, String::new(), Vec::new())
    }
}

impl FunctionDeclarationNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, params: NodeList, definition: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            params,
            definition: RefCell::new(definition),
        })
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl FunctionInvocationNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, callee: Node, arguments: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            callee: RefCell::new(callee),
            arguments: RefCell::new(arguments),
        })
    }
}

impl ReturnNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, value: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            value: RefCell::new(value),
        })
    }
}

impl ControlFlowNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, branches: Vec<ControlFlowBranch>) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            branches: RefCell::new(branches),
        })
    }
}

impl BinaryOperationNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, operator: String, left: Node, right: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            operator,
            left: RefCell::new(left),
            right: RefCell::new(right),
        })
    }
}

impl UnaryOperationNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, operator: String, value: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            operator,
            value: RefCell::new(value),
        })
    }
}

impl NumberLiteralNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, value: String) -> Rc<Self> {
        Rc::new(Self { id, location, value })
    }

    /// Parses the literal text as an `i64`. Returns `None` for values that were
    /// lexable-but-not-integer (floats — see the §9 preserved-bug list: floats lex but
    /// compile as integers, so callers generally truncate rather than reject).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.value
            .parse::<f64>()
            .ok()
            .map(|f| f.trunc() as i64)
            .or_else(|| self.value.parse::<i64>().ok())
    }
}

impl StringLiteralNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, value: String) -> Rc<Self> {
        Rc::new(Self { id, location, value })
    }
}

impl BooleanLiteralNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, value: bool) -> Rc<Self> {
        Rc::new(Self { id, location, value })
    }
}

impl SymbolNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: String) -> Rc<Self> {
        Rc::new(Self { id, location, name })
    }
}

impl ListNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, elements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            elements: RefCell::new(elements),
        })
    }
}

impl DictionaryNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, elements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            elements: RefCell::new(elements),
        })
    }
}

impl TupleNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, elements: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            elements: RefCell::new(elements),
        })
    }
}

impl EnumNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: String, symbols: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            name,
            symbols,
        })
    }
}

impl StructDefinitionNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, name: String, fields: NodeList) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            name,
            fields,
        })
    }
}

impl StructDeclarationNode {
    #[must_use]
    pub fn new(id: NodeId, location: Location, type_name: String, value: Node) -> Rc<Self> {
        Rc::new(Self {
            id,
            location,
            type_name,
            value: RefCell::new(value),
        })
    }
}

impl Node {
    /// `true` for the three literal kinds the optimizer inlines and the type checker
    /// treats as leaf types (§4.4/§4.5).
    #[must_use]
    pub fn is_inlinable_literal(&self) -> bool {
        matches!(
            self,
            Node::NumberLiteral(_) | Node::StringLiteral(_) | Node::BooleanLiteral(_)
        )
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&Rc<IdentifierNode>> {
        match self {
            Node::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// Direct child nodes, for tree-wide passes that don't need kind-specific handling
    /// (e.g. the wasm code generator's string-literal interning sweep).
    #[must_use]
    pub fn children(&self) -> NodeList {
        match self {
            Node::Source(s) => {
                let mut out = s.links.borrow().clone();
                out.extend(s.value.borrow().clone());
                out
            }
            Node::Link(l) => l.value.borrow().clone().into_iter().collect(),
            Node::Capsule(c) => c.elements.borrow().clone(),
            Node::Block(b) => b.statements.borrow().clone(),
            Node::AstNodeList(l) => l.elements.borrow().clone(),
            Node::Assignment(a) => vec![a.left.borrow().clone(), a.right.borrow().clone()],
            Node::Identifier(i) => i.value.borrow().clone().into_iter().collect(),
            Node::TypeDeclaration(t) => t.elements.clone(),
            Node::FunctionDeclaration(f) => {
                let mut out = f.params.clone();
                out.push(f.definition.borrow().clone());
                out
            }
            Node::FunctionInvocation(inv) => {
                let mut out = vec![inv.callee.borrow().clone()];
                out.extend(inv.arguments.borrow().clone());
                out
            }
            Node::Return(r) => vec![r.value.borrow().clone()],
            Node::ControlFlow(cf) => {
                let mut out = Vec::new();
                for branch in cf.branches.borrow().iter() {
                    if let Some(cond) = &branch.condition {
                        out.push(cond.clone());
                    }
                    out.push(branch.body.clone());
                }
                out
            }
            Node::BinaryOperation(b) => vec![b.left.borrow().clone(), b.right.borrow().clone()],
            Node::UnaryOperation(u) => vec![u.value.borrow().clone()],
            Node::NumberLiteral(_) | Node::StringLiteral(_) | Node::BooleanLiteral(_) | Node::Symbol(_) => Vec::new(),
            Node::List(l) => l.elements.borrow().clone(),
            Node::Dictionary(d) => d.elements.borrow().clone(),
            Node::Tuple(t) => t.elements.borrow().clone(),
            Node::Enum(e) => e.symbols.clone(),
            Node::StructDefinition(sd) => sd.fields.clone(),
            Node::StructDeclaration(sd) => vec![sd.value.borrow().clone()],
        }
    }
}
