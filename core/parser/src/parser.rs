//! Recursive-descent parser, grounded on `original_source/src/parser/Parser.cpp` and
//! SPEC_FULL.md §4.2. One method per grammar production, descending precedence from
//! `parse_source` down to `parse_primary`.

use theta_ast::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use theta_ast::location::Location;
use theta_ast::nodes::{
    AssignmentNode, AstNodeListNode, BinaryOperationNode, BlockNode, BooleanLiteralNode,
    CapsuleNode, ControlFlowBranch, ControlFlowNode, DictionaryNode, EnumNode,
    FunctionDeclarationNode, FunctionInvocationNode, IdentifierNode, LinkNode, ListNode, Node,
    NodeId, NodeList, NumberLiteralNode, ReturnNode, SourceNode, StringLiteralNode,
    StructDeclarationNode, StructDefinitionNode, SymbolNode, TupleNode, TypeDeclarationNode,
    TypeName, UnaryOperationNode,
};
use theta_lexer::token::{Token, TokenKind};

/// Characters that may never appear inside an identifier (SPEC_FULL.md §4.2).
const DISALLOWED_IDENT_CHARS: &str = "!@#$%^&*()-=+/<>{}[]|?,`~";

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: NodeId,
    diagnostics: DiagnosticSink,
}

/// Parses a full token stream into a `Source` node, returning the accumulated
/// diagnostics alongside it (never an `Err`: parse failures are diagnostics, not
/// aborts — see SPEC_FULL.md §4.2 Failure semantics).
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (Node, DiagnosticSink) {
    let mut parser = Parser {
        tokens,
        pos: 0,
        next_id: 0,
        diagnostics: DiagnosticSink::new(),
    };
    let source = parser.parse_source();
    (source, parser.diagnostics)
}

impl Parser {
    fn fresh_id(&mut self) -> NodeId {
        self.next_id += 1;
        self.next_id
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn current_location(&self) -> Location {
        self.peek()
            .map(|t| t.location)
            .or_else(|| self.tokens.last().map(|t| t.location))
            .unwrap_or_else(|| Location::synthetic(1, 1))
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn check_keyword(&self, word: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword && t.lexeme == word)
    }

    fn check_operator(&self, op: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Operator && t.lexeme == op)
    }

    fn consume_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let loc = self.current_location();
        self.diagnostics.push(Diagnostic::new(kind, message, Some(loc)));
    }

    /// Consumes a token of `kind`, emitting a `ParseError` and resynchronizing by
    /// consuming the offending token instead of unwinding when it is missing.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check_kind(kind) {
            self.advance()
        } else {
            self.error(
                DiagnosticKind::ParseError,
                format!("expected {what}, found {:?}", self.peek().map(|t| &t.lexeme)),
            );
            if self.peek().is_some() {
                self.advance();
            }
            None
        }
    }

    fn expect_identifier_name(&mut self) -> String {
        match self.expect(TokenKind::Identifier, "identifier") {
            Some(t) => {
                self.validate_identifier(&t.lexeme, t.location);
                t.lexeme
            }
            None => String::new(),
        }
    }

    fn validate_identifier(&mut self, name: &str, location: Location) {
        let starts_with_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
        let has_disallowed = name.chars().any(|c| DISALLOWED_IDENT_CHARS.contains(c));
        if starts_with_digit || has_disallowed {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::SyntaxError,
                format!("invalid identifier `{name}`"),
                Some(location),
            ));
        }
    }

    // ---- source / link / capsule -----------------------------------------------------

    fn parse_source(&mut self) -> Node {
        let start_loc = self.current_location();
        let mut links = Vec::new();
        while self.check_keyword("link") {
            links.push(self.parse_link());
        }
        let value = if self.peek().is_some() {
            Some(self.parse_capsule_or_bare())
        } else {
            None
        };
        while self.peek().is_some() {
            self.error(
                DiagnosticKind::ParseError,
                format!("unexpected leftover token `{}`", self.peek().unwrap().lexeme),
            );
            self.advance();
        }
        let id = self.fresh_id();
        Node::Source(SourceNode::new(id, start_loc, links, value))
    }

    fn parse_link(&mut self) -> Node {
        let start_loc = self.current_location();
        self.consume_keyword("link");
        let name = self.expect_identifier_name();
        let id = self.fresh_id();
        Node::Link(LinkNode::new(id, start_loc, name, None))
    }

    /// `capsule := 'capsule' Ident block | return`. The fallthrough lets a bare top-level
    /// expression parse (used by the REPL, §6).
    fn parse_capsule_or_bare(&mut self) -> Node {
        if self.check_keyword("capsule") {
            let start_loc = self.current_location();
            self.advance();
            let name = self.expect_identifier_name();
            let body = self.parse_block();
            let elements = match body {
                Node::Block(block) => block.statements.borrow().clone(),
                other => vec![other],
            };
            let id = self.fresh_id();
            Node::Capsule(CapsuleNode::new(id, start_loc, name, elements))
        } else {
            self.parse_return()
        }
    }

    // ---- return / structDef / assignment / block / funcDecl --------------------------

    fn parse_return(&mut self) -> Node {
        if self.check_keyword("return") {
            let start_loc = self.current_location();
            self.advance();
            let value = self.parse_assignment();
            let id = self.fresh_id();
            Node::Return(ReturnNode::new(id, start_loc, value))
        } else {
            self.parse_struct_def()
        }
    }

    fn parse_struct_def(&mut self) -> Node {
        if self.check_keyword("struct") {
            let start_loc = self.current_location();
            self.advance();
            let name = self.expect_identifier_name();
            self.expect(TokenKind::BraceOpen, "`{`");
            let mut fields = Vec::new();
            while self.check_kind(TokenKind::Identifier) {
                let field_loc = self.current_location();
                let field_name = self.expect_identifier_name();
                let field_id = self.fresh_id();
                fields.push(Node::Identifier(IdentifierNode::new(
                    field_id, field_loc, field_name, None,
                )));
            }
            self.expect(TokenKind::BraceClose, "`}`");
            let id = self.fresh_id();
            Node::StructDefinition(StructDefinitionNode::new(id, start_loc, name, fields))
        } else {
            self.parse_assignment()
        }
    }

    fn parse_assignment(&mut self) -> Node {
        let left = self.parse_expression();
        if self.check_kind(TokenKind::Assignment) {
            let loc = left.location();
            self.advance();
            let right = self.parse_func_decl();
            let id = self.fresh_id();
            Node::Assignment(AssignmentNode::new(id, loc, left, right))
        } else {
            left
        }
    }

    fn parse_block(&mut self) -> Node {
        if self.check_kind(TokenKind::BraceOpen) {
            let start_loc = self.current_location();
            self.advance();
            let mut statements = Vec::new();
            while self.peek().is_some() && !self.check_kind(TokenKind::BraceClose) {
                statements.push(self.parse_return());
            }
            self.expect(TokenKind::BraceClose, "`}`");
            let id = self.fresh_id();
            Node::Block(BlockNode::new(id, start_loc, statements))
        } else {
            let start_loc = self.current_location();
            let stmt = self.parse_func_decl();
            let id = self.fresh_id();
            Node::Block(BlockNode::new(id, start_loc, vec![stmt]))
        }
    }

    /// `funcDecl := assignment ('->' block)?`, with the "no parameters, just `->`"
    /// shorthand handled before falling into `parse_assignment`.
    fn parse_func_decl(&mut self) -> Node {
        if self.check_kind(TokenKind::FuncDeclaration) {
            let start_loc = self.current_location();
            self.advance();
            let body = self.parse_block();
            let id = self.fresh_id();
            return Node::FunctionDeclaration(FunctionDeclarationNode::new(
                id, start_loc, Vec::new(), body,
            ));
        }
        let left = self.parse_assignment();
        if self.check_kind(TokenKind::FuncDeclaration) {
            let start_loc = left.location();
            self.advance();
            let body = self.parse_block();
            let params = Self::extract_params(left);
            let id = self.fresh_id();
            Node::FunctionDeclaration(FunctionDeclarationNode::new(id, start_loc, params, body))
        } else {
            left
        }
    }

    fn extract_params(node: Node) -> NodeList {
        match node {
            Node::AstNodeList(list) => list.elements.borrow().clone(),
            other => vec![other],
        }
    }

    // ---- expression / structDecl / enum / controlFlow ---------------------------------

    fn parse_expression(&mut self) -> Node {
        self.parse_struct_decl()
    }

    fn parse_struct_decl(&mut self) -> Node {
        if self.check_kind(TokenKind::At) {
            let start_loc = self.current_location();
            self.advance();
            let type_name = self.expect_identifier_name();
            let dict = self.parse_forced_dict();
            let id = self.fresh_id();
            Node::StructDeclaration(StructDeclarationNode::new(id, start_loc, type_name, dict))
        } else {
            self.parse_enum()
        }
    }

    fn parse_forced_dict(&mut self) -> Node {
        let start_loc = self.current_location();
        self.expect(TokenKind::BraceOpen, "`{`");
        let mut entries = Vec::new();
        while self.check_kind(TokenKind::Identifier) {
            let entry_loc = self.current_location();
            let key_loc = entry_loc;
            let key_name = self.expect_identifier_name();
            let key_id = self.fresh_id();
            let key = Node::Symbol(SymbolNode::new(key_id, key_loc, key_name));
            self.expect(TokenKind::Colon, "`:`");
            let value = self.parse_expression();
            let tuple_id = self.fresh_id();
            entries.push(Node::Tuple(TupleNode::new(
                tuple_id,
                entry_loc,
                vec![key, value],
            )));
            if !self.consume_kind_comma() {
                break;
            }
        }
        self.expect(TokenKind::BraceClose, "`}`");
        let id = self.fresh_id();
        Node::Dictionary(DictionaryNode::new(id, start_loc, entries))
    }

    fn consume_kind_comma(&mut self) -> bool {
        if self.check_kind(TokenKind::Comma) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_enum(&mut self) -> Node {
        if self.check_keyword("enum") {
            let start_loc = self.current_location();
            self.advance();
            let name = self.expect_identifier_name();
            self.expect(TokenKind::BraceOpen, "`{`");
            let mut symbols = Vec::new();
            while self.check_kind(TokenKind::Colon) {
                self.advance();
                let sym_loc = self.current_location();
                let sym_name = self.expect_identifier_name();
                let sym_id = self.fresh_id();
                symbols.push(Node::Symbol(SymbolNode::new(sym_id, sym_loc, sym_name)));
            }
            self.expect(TokenKind::BraceClose, "`}`");
            let id = self.fresh_id();
            Node::Enum(EnumNode::new(id, start_loc, name, symbols))
        } else {
            self.parse_control_flow()
        }
    }

    fn parse_control_flow(&mut self) -> Node {
        if self.check_keyword("if") {
            let start_loc = self.current_location();
            let mut branches = Vec::new();
            self.advance();
            loop {
                let condition = self.parse_expression();
                let body = self.parse_block();
                branches.push(ControlFlowBranch {
                    condition: Some(condition),
                    body,
                });
                if self.check_keyword("else") {
                    self.advance();
                    if self.check_keyword("if") {
                        self.advance();
                        continue;
                    }
                    let body = self.parse_block();
                    branches.push(ControlFlowBranch {
                        condition: None,
                        body,
                    });
                }
                break;
            }
            let id = self.fresh_id();
            Node::ControlFlow(ControlFlowNode::new(id, start_loc, branches))
        } else {
            self.parse_pipeline()
        }
    }

    // ---- binary precedence chain -------------------------------------------------------

    fn parse_pipeline(&mut self) -> Node {
        self.parse_binary_level(&["=>"], Self::parse_boolean_comp)
    }

    fn parse_boolean_comp(&mut self) -> Node {
        self.parse_binary_level(&["&&", "||"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Node {
        self.parse_binary_level(&["==", "!="], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Node {
        self.parse_binary_level(&["<", ">", "<=", ">="], Self::parse_term)
    }

    fn parse_term(&mut self) -> Node {
        self.parse_binary_level(&["+", "-"], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Node {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_exponent)
    }

    fn parse_exponent(&mut self) -> Node {
        self.parse_binary_level(&["**"], Self::parse_unary)
    }

    fn parse_binary_level(&mut self, ops: &[&str], sub: fn(&mut Self) -> Node) -> Node {
        let mut left = sub(self);
        loop {
            let matched = ops.iter().find(|op| self.check_operator(op));
            let Some(op) = matched else { break };
            let op = (*op).to_string();
            let loc = left.location();
            self.advance();
            let right = sub(self);
            let id = self.fresh_id();
            left = Node::BinaryOperation(BinaryOperationNode::new(id, loc, op, left, right));
        }
        left
    }

    fn parse_unary(&mut self) -> Node {
        if self.check_operator("!") || self.check_operator("-") {
            let start_loc = self.current_location();
            let op = self.advance().unwrap().lexeme;
            let value = self.parse_unary();
            let id = self.fresh_id();
            Node::UnaryOperation(UnaryOperationNode::new(id, start_loc, op, value))
        } else {
            self.parse_primary()
        }
    }

    // ---- primary ------------------------------------------------------------------------

    fn parse_primary(&mut self) -> Node {
        let Some(tok) = self.peek().cloned() else {
            self.error(DiagnosticKind::ParseError, "unexpected end of input");
            let id = self.fresh_id();
            return Node::BooleanLiteral(BooleanLiteralNode::new(
                id,
                Location::synthetic(1, 1),
                false,
            ));
        };
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let id = self.fresh_id();
                Node::NumberLiteral(NumberLiteralNode::new(id, tok.location, tok.lexeme))
            }
            TokenKind::String => {
                self.advance();
                let id = self.fresh_id();
                Node::StringLiteral(StringLiteralNode::new(id, tok.location, tok.lexeme))
            }
            TokenKind::Boolean => {
                self.advance();
                let id = self.fresh_id();
                Node::BooleanLiteral(BooleanLiteralNode::new(id, tok.location, tok.lexeme == "true"))
            }
            TokenKind::Identifier => {
                self.advance();
                self.validate_identifier(&tok.lexeme, tok.location);
                let id = self.fresh_id();
                let value = self.parse_optional_type_annotation();
                let mut node = Node::Identifier(IdentifierNode::new(id, tok.location, tok.lexeme, value));
                while self.check_kind(TokenKind::ParenOpen) {
                    node = self.parse_invocation(node);
                }
                node
            }
            TokenKind::Colon => {
                self.advance();
                let sym_loc = self.current_location();
                let name = self.expect_identifier_name();
                let id = self.fresh_id();
                Node::Symbol(SymbolNode::new(id, sym_loc, name))
            }
            TokenKind::BracketOpen => self.parse_list(),
            TokenKind::BraceOpen => self.parse_brace_expression(),
            TokenKind::ParenOpen => self.parse_paren_expr_list(),
            _ => {
                self.error(
                    DiagnosticKind::ParseError,
                    format!("unexpected token `{}`", tok.lexeme),
                );
                self.advance();
                let id = self.fresh_id();
                Node::BooleanLiteral(BooleanLiteralNode::new(id, tok.location, false))
            }
        }
    }

    /// `identifier ('<' type '>')?` (SPEC_FULL.md §4.2 Identifier). Matches `<`
    /// unconditionally right after the identifier, so a bare `<`/`>` comparison
    /// immediately following an identifier is swallowed as a type annotation instead —
    /// the original grammar has this same ambiguity (see DESIGN.md Open Question 8).
    fn parse_optional_type_annotation(&mut self) -> Option<Node> {
        if self.check_operator("<") {
            self.advance();
            let ty = self.parse_type();
            if self.check_operator(">") {
                self.advance();
            }
            Some(ty)
        } else {
            None
        }
    }

    /// `type := identifier ('<' type (',' type)? '>')?`. `Variadic`'s generic list is
    /// the exception: every comma-separated type becomes an element, not just two.
    fn parse_type(&mut self) -> Node {
        let start_loc = self.current_location();
        let name_str = self.expect_identifier_name();
        let (name, type_name) = Self::resolve_type_name(&name_str);
        let mut elements = Vec::new();
        if self.check_operator("<") {
            self.advance();
            let first = self.parse_type();
            if name == TypeName::Variadic {
                elements.push(first);
                while self.consume_kind_comma() {
                    elements.push(self.parse_type());
                }
            } else if self.consume_kind_comma() {
                elements.push(first);
                elements.push(self.parse_type());
            } else {
                elements.push(first);
            }
            if self.check_operator(">") {
                self.advance();
            }
        }
        let id = self.fresh_id();
        Node::TypeDeclaration(TypeDeclarationNode::new(id, start_loc, name, type_name, elements))
    }

    fn resolve_type_name(name: &str) -> (TypeName, String) {
        match name {
            "Number" => (TypeName::Number, String::new()),
            "String" => (TypeName::String, String::new()),
            "Boolean" => (TypeName::Boolean, String::new()),
            "Symbol" => (TypeName::Symbol, String::new()),
            "Tuple" => (TypeName::Tuple, String::new()),
            "List" => (TypeName::List, String::new()),
            "Dict" => (TypeName::Dict, String::new()),
            "Function" => (TypeName::Function, String::new()),
            "Variadic" => (TypeName::Variadic, String::new()),
            "Capsule" => (TypeName::Capsule, String::new()),
            other => (TypeName::Struct, other.to_string()),
        }
    }

    fn parse_invocation(&mut self, callee: Node) -> Node {
        let start_loc = callee.location();
        self.advance();
        let mut arguments = Vec::new();
        if !self.check_kind(TokenKind::ParenClose) {
            loop {
                arguments.push(self.parse_expression());
                if !self.consume_kind_comma() {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenClose, "`)`");
        let id = self.fresh_id();
        Node::FunctionInvocation(FunctionInvocationNode::new(id, start_loc, callee, arguments))
    }

    fn parse_list(&mut self) -> Node {
        let start_loc = self.current_location();
        self.advance();
        let mut elements = Vec::new();
        if !self.check_kind(TokenKind::BracketClose) {
            loop {
                elements.push(self.parse_expression());
                if !self.consume_kind_comma() {
                    break;
                }
            }
        }
        self.expect(TokenKind::BracketClose, "`]`");
        let id = self.fresh_id();
        Node::List(ListNode::new(id, start_loc, elements))
    }

    fn parse_paren_expr_list(&mut self) -> Node {
        let start_loc = self.current_location();
        self.advance();
        let mut elements = Vec::new();
        if !self.check_kind(TokenKind::ParenClose) {
            loop {
                elements.push(self.parse_expression());
                if !self.consume_kind_comma() {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenClose, "`)`");
        if elements.len() == 1 {
            elements.into_iter().next().unwrap()
        } else {
            let id = self.fresh_id();
            Node::AstNodeList(AstNodeListNode::new(id, start_loc, elements))
        }
    }

    /// Disambiguates `{ ... }` in expression position by scanning (at brace-depth zero)
    /// for the first top-level `:` or `,` before the matching close brace, per
    /// SPEC_FULL.md §4.2's Key design decisions.
    fn parse_brace_expression(&mut self) -> Node {
        let start_loc = self.current_location();
        match self.classify_brace_contents() {
            BraceShape::EmptyDict => {
                self.advance();
                self.expect(TokenKind::BraceClose, "`}`");
                let id = self.fresh_id();
                Node::Dictionary(DictionaryNode::new(id, start_loc, Vec::new()))
            }
            BraceShape::Dict => self.parse_forced_dict(),
            BraceShape::Tuple => {
                self.advance();
                let mut elements = Vec::new();
                loop {
                    elements.push(self.parse_expression());
                    if !self.consume_kind_comma() {
                        break;
                    }
                }
                self.expect(TokenKind::BraceClose, "`}`");
                let id = self.fresh_id();
                Node::Tuple(TupleNode::new(id, start_loc, elements))
            }
            BraceShape::Block => {
                self.advance();
                let mut statements = Vec::new();
                while self.peek().is_some() && !self.check_kind(TokenKind::BraceClose) {
                    statements.push(self.parse_return());
                }
                self.expect(TokenKind::BraceClose, "`}`");
                let id = self.fresh_id();
                Node::Block(BlockNode::new(id, start_loc, statements))
            }
        }
    }

    fn classify_brace_contents(&self) -> BraceShape {
        debug_assert!(self.check_kind(TokenKind::BraceOpen));
        if self.tokens.get(self.pos + 1).map(|t| t.kind) == Some(TokenKind::BraceClose) {
            return BraceShape::EmptyDict;
        }
        let mut depth = 0i32;
        let mut i = self.pos;
        while let Some(t) = self.tokens.get(i) {
            match t.kind {
                TokenKind::BraceOpen | TokenKind::ParenOpen | TokenKind::BracketOpen => depth += 1,
                TokenKind::BraceClose | TokenKind::ParenClose | TokenKind::BracketClose => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Colon if depth == 1 => return BraceShape::Dict,
                TokenKind::Comma if depth == 1 => return BraceShape::Tuple,
                _ => {}
            }
            i += 1;
        }
        BraceShape::Block
    }
}

enum BraceShape {
    EmptyDict,
    Dict,
    Tuple,
    Block,
}
