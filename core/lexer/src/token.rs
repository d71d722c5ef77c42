use theta_ast::location::Location;

/// The closed set of token kinds the lexer emits. `Newline`/`Whitespace`/`Comment`/
/// `MultilineComment` are produced internally but dropped before the final token stream
/// reaches the parser (see `Lexer::lex`'s `NON_EMITTED` filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    String,
    Number,
    Boolean,
    Keyword,
    Identifier,
    Comment,
    MultilineComment,
    Operator,
    Assignment,
    FuncDeclaration,
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Comma,
    Colon,
    At,
    Newline,
    Whitespace,
    Unhandled,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: Location,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }
}

/// Tokens the lexer keeps accumulating characters into until a delimiter is hit, rather
/// than recognizing in one shot (mirrors `ACCUMULATED_TOKENS` in
/// `original_source/src/lexer/Lexer.cpp`).
pub const ACCUMULATED_KINDS: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::Keyword,
    TokenKind::Boolean,
    TokenKind::Comment,
    TokenKind::MultilineComment,
    TokenKind::String,
    TokenKind::Number,
];

pub const LANGUAGE_RESERVED_WORDS: &[&str] =
    &["link", "capsule", "if", "else", "struct", "enum", "return"];
