//! The Theta AST: a single polymorphic `Node` enum whose variants wrap `Rc`-shared node
//! structs, following the teacher crate's `Expression`/`Statement` idiom. Slots that
//! optimizer passes rewrite in place are `RefCell`-wrapped, exactly as the teacher
//! wraps its own mutable expression fields.

use std::cell::RefCell;
use std::rc::Rc;

use crate::location::Location;

pub type NodeId = u32;

/// A list of child nodes, used directly as a struct field wherever a node's shape is
/// "an ordered list of elements" (capsule bodies, block statements, tuple/list/dict
/// elements, struct fields, enum symbols). Distinct from the `AstNodeList` node kind,
/// which stands for a parenthesized multi-expression group used as a single value.
pub type NodeList = Vec<Node>;

#[derive(Debug, Clone)]
pub enum Node {
    Source(Rc<SourceNode>),
    Link(Rc<LinkNode>),
    Capsule(Rc<CapsuleNode>),
    Block(Rc<BlockNode>),
    AstNodeList(Rc<AstNodeListNode>),
    Assignment(Rc<AssignmentNode>),
    Identifier(Rc<IdentifierNode>),
    TypeDeclaration(Rc<TypeDeclarationNode>),
    FunctionDeclaration(Rc<FunctionDeclarationNode>),
    FunctionInvocation(Rc<FunctionInvocationNode>),
    Return(Rc<ReturnNode>),
    ControlFlow(Rc<ControlFlowNode>),
    BinaryOperation(Rc<BinaryOperationNode>),
    UnaryOperation(Rc<UnaryOperationNode>),
    NumberLiteral(Rc<NumberLiteralNode>),
    StringLiteral(Rc<StringLiteralNode>),
    BooleanLiteral(Rc<BooleanLiteralNode>),
    Symbol(Rc<SymbolNode>),
    List(Rc<ListNode>),
    Dictionary(Rc<DictionaryNode>),
    Tuple(Rc<TupleNode>),
    Enum(Rc<EnumNode>),
    StructDefinition(Rc<StructDefinitionNode>),
    StructDeclaration(Rc<StructDeclarationNode>),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Node::Source(n) => n.id,
            Node::Link(n) => n.id,
            Node::Capsule(n) => n.id,
            Node::Block(n) => n.id,
            Node::AstNodeList(n) => n.id,
            Node::Assignment(n) => n.id,
            Node::Identifier(n) => n.id,
            Node::TypeDeclaration(n) => n.id,
            Node::FunctionDeclaration(n) => n.id,
            Node::FunctionInvocation(n) => n.id,
            Node::Return(n) => n.id,
            Node::ControlFlow(n) => n.id,
            Node::BinaryOperation(n) => n.id,
            Node::UnaryOperation(n) => n.id,
            Node::NumberLiteral(n) => n.id,
            Node::StringLiteral(n) => n.id,
            Node::BooleanLiteral(n) => n.id,
            Node::Symbol(n) => n.id,
            Node::List(n) => n.id,
            Node::Dictionary(n) => n.id,
            Node::Tuple(n) => n.id,
            Node::Enum(n) => n.id,
            Node::StructDefinition(n) => n.id,
            Node::StructDeclaration(n) => n.id,
        }
    }

    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Node::Source(n) => n.location,
            Node::Link(n) => n.location,
            Node::Capsule(n) => n.location,
            Node::Block(n) => n.location,
            Node::AstNodeList(n) => n.location,
            Node::Assignment(n) => n.location,
            Node::Identifier(n) => n.location,
            Node::TypeDeclaration(n) => n.location,
            Node::FunctionDeclaration(n) => n.location,
            Node::FunctionInvocation(n) => n.location,
            Node::Return(n) => n.location,
            Node::ControlFlow(n) => n.location,
            Node::BinaryOperation(n) => n.location,
            Node::UnaryOperation(n) => n.location,
            Node::NumberLiteral(n) => n.location,
            Node::StringLiteral(n) => n.location,
            Node::BooleanLiteral(n) => n.location,
            Node::Symbol(n) => n.location,
            Node::List(n) => n.location,
            Node::Dictionary(n) => n.location,
            Node::Tuple(n) => n.location,
            Node::Enum(n) => n.location,
            Node::StructDefinition(n) => n.location,
            Node::StructDeclaration(n) => n.location,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Source(_) => "Source",
            Node::Link(_) => "Link",
            Node::Capsule(_) => "Capsule",
            Node::Block(_) => "Block",
            Node::AstNodeList(_) => "AstNodeList",
            Node::Assignment(_) => "Assignment",
            Node::Identifier(_) => "Identifier",
            Node::TypeDeclaration(_) => "TypeDeclaration",
            Node::FunctionDeclaration(_) => "FunctionDeclaration",
            Node::FunctionInvocation(_) => "FunctionInvocation",
            Node::Return(_) => "Return",
            Node::ControlFlow(_) => "ControlFlow",
            Node::BinaryOperation(_) => "BinaryOperation",
            Node::UnaryOperation(_) => "UnaryOperation",
            Node::NumberLiteral(_) => "NumberLiteral",
            Node::StringLiteral(_) => "StringLiteral",
            Node::BooleanLiteral(_) => "BooleanLiteral",
            Node::Symbol(_) => "Symbol",
            Node::List(_) => "List",
            Node::Dictionary(_) => "Dictionary",
            Node::Tuple(_) => "Tuple",
            Node::Enum(_) => "Enum",
            Node::StructDefinition(_) => "StructDefinition",
            Node::StructDeclaration(_) => "StructDeclaration",
        }
    }

    /// True for node kinds that own their own lexical scope (per §3.2/§4.4: Block and
    /// Capsule push a scope; everything else inherits its enclosing one).
    #[must_use]
    pub fn introduces_scope(&self) -> bool {
        matches!(self, Node::Block(_) | Node::Capsule(_))
    }
}

#[derive(Debug)]
pub struct SourceNode {
    pub id: NodeId,
    pub location: Location,
    pub links: RefCell<NodeList>,
    pub value: RefCell<Option<Node>>,
}

#[derive(Debug)]
pub struct LinkNode {
    pub id: NodeId,
    pub location: Location,
    pub capsule_name: String,
    pub value: RefCell<Option<Node>>,
}

#[derive(Debug)]
pub struct CapsuleNode {
    pub id: NodeId,
    pub location: Location,
    pub name: String,
    pub elements: RefCell<NodeList>,
}

#[derive(Debug)]
pub struct BlockNode {
    pub id: NodeId,
    pub location: Location,
    pub statements: RefCell<NodeList>,
}

/// Stands for a parenthesized group of more than one expression, e.g. `(a, b, c)` used
/// in a value position. A single-element `(expr)` is never wrapped: the parser returns
/// the inner expression directly.
#[derive(Debug)]
pub struct AstNodeListNode {
    pub id: NodeId,
    pub location: Location,
    pub elements: RefCell<NodeList>,
}

#[derive(Debug)]
pub struct AssignmentNode {
    pub id: NodeId,
    pub location: Location,
    pub left: RefCell<Node>,
    pub right: RefCell<Node>,
}

/// An identifier. `value` holds the identifier's declared type (set by the parser for
/// function parameters and assignment left-hand sides); it is `None` for ordinary
/// identifier references.
#[derive(Debug)]
pub struct IdentifierNode {
    pub id: NodeId,
    pub location: Location,
    pub name: String,
    pub value: RefCell<Option<Node>>,
}

/// A type expression. All shapes (unary, left/right, element-list) collapse to a single
/// `elements` list — see DESIGN.md Open Question 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TypeName {
    Number,
    String,
    Boolean,
    Symbol,
    Tuple,
    List,
    Dict,
    Function,
    Variadic,
    Capsule,
    Struct,
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeName::Number => "Number",
            TypeName::String => "String",
            TypeName::Boolean => "Boolean",
            TypeName::Symbol => "Symbol",
            TypeName::Tuple => "Tuple",
            TypeName::List => "List",
            TypeName::Dict => "Dict",
            TypeName::Function => "Function",
            TypeName::Variadic => "Variadic",
            TypeName::Capsule => "Capsule",
            TypeName::Struct => "Struct",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug)]
pub struct TypeDeclarationNode {
    pub id: NodeId,
    pub location: Location,
    pub name: TypeName,
    /// For `Struct`/`Capsule`, the referenced name. Empty for all other kinds.
    pub type_name: String,
    pub elements: NodeList,
}

#[derive(Debug)]
pub struct FunctionDeclarationNode {
    pub id: NodeId,
    pub location: Location,
    /// Parameter identifiers; each carries its declared type in `.value`.
    pub params: NodeList,
    pub definition: RefCell<Node>,
}

#[derive(Debug)]
pub struct FunctionInvocationNode {
    pub id: NodeId,
    pub location: Location,
    pub callee: RefCell<Node>,
    pub arguments: RefCell<NodeList>,
}

#[derive(Debug)]
pub struct ReturnNode {
    pub id: NodeId,
    pub location: Location,
    pub value: RefCell<Node>,
}

#[derive(Debug, Clone)]
pub struct ControlFlowBranch {
    /// `None` for the trailing `else` branch.
    pub condition: Option<Node>,
    pub body: Node,
}

#[derive(Debug)]
pub struct ControlFlowNode {
    pub id: NodeId,
    pub location: Location,
    pub branches: RefCell<Vec<ControlFlowBranch>>,
}

#[derive(Debug)]
pub struct BinaryOperationNode {
    pub id: NodeId,
    pub location: Location,
    pub operator: String,
    pub left: RefCell<Node>,
    pub right: RefCell<Node>,
}

#[derive(Debug)]
pub struct UnaryOperationNode {
    pub id: NodeId,
    pub location: Location,
    pub operator: String,
    pub value: RefCell<Node>,
}

#[derive(Debug)]
pub struct NumberLiteralNode {
    pub id: NodeId,
    pub location: Location,
    pub value: String,
}

#[derive(Debug)]
pub struct StringLiteralNode {
    pub id: NodeId,
    pub location: Location,
    pub value: String,
}

#[derive(Debug)]
pub struct BooleanLiteralNode {
    pub id: NodeId,
    pub location: Location,
    pub value: bool,
}

/// An interned identifier literal, e.g. `:ok`. Stored without its leading colon; callers
/// format the colon back on when needed (mangled enum-member names, printing).
#[derive(Debug)]
pub struct SymbolNode {
    pub id: NodeId,
    pub location: Location,
    pub name: String,
}

#[derive(Debug)]
pub struct ListNode {
    pub id: NodeId,
    pub location: Location,
    pub elements: RefCell<NodeList>,
}

/// Entries are `Tuple(Symbol, value)` nodes, matching the parser's own desugaring of
/// `{ k: v, ... }` (see SPEC_FULL.md §4.2).
#[derive(Debug)]
pub struct DictionaryNode {
    pub id: NodeId,
    pub location: Location,
    pub elements: RefCell<NodeList>,
}

#[derive(Debug)]
pub struct TupleNode {
    pub id: NodeId,
    pub location: Location,
    pub elements: RefCell<NodeList>,
}

#[derive(Debug)]
pub struct EnumNode {
    pub id: NodeId,
    pub location: Location,
    pub name: String,
    pub symbols: NodeList,
}

#[derive(Debug)]
pub struct StructDefinitionNode {
    pub id: NodeId,
    pub location: Location,
    pub name: String,
    /// Identifier nodes, each carrying its field type in `.value`.
    pub fields: NodeList,
}

/// A struct literal `@TypeName { k: v, ... }`; `value` is a `Dictionary` node.
#[derive(Debug)]
pub struct StructDeclarationNode {
    pub id: NodeId,
    pub location: Location,
    pub type_name: String,
    pub value: RefCell<Node>,
}
