//! Single-pass, single-character-lookahead lexer, grounded on
//! `original_source/src/lexer/Lexer.cpp`.
//!
//! The algorithm walks the source byte-by-byte (treating it as ASCII, matching the
//! original), classifying runs of characters into tokens. Multi-character operators are
//! matched before single-character ones so `==` never splits into two `Assignment`-ish
//! tokens, and `**` never splits into two `*` tokens.

use theta_ast::location::Location;

use crate::token::{Token, TokenKind, LANGUAGE_RESERVED_WORDS};

/// Operators and punctuation, longest-match-first. Order matters: `**` must be checked
/// before `*`, `==`/`!=`/`<=`/`>=` before `=`/`<`/`>`, etc.
const MULTI_CHAR_OPERATORS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("&&", TokenKind::Operator),
    ("||", TokenKind::Operator),
    ("**", TokenKind::Operator),
    ("+=", TokenKind::Operator),
    ("-=", TokenKind::Operator),
    ("*=", TokenKind::Operator),
    ("->", TokenKind::FuncDeclaration),
    ("=>", TokenKind::Operator),
];

const SINGLE_CHAR_TOKENS: &[(char, TokenKind)] = &[
    ('+', TokenKind::Operator),
    ('-', TokenKind::Operator),
    ('*', TokenKind::Operator),
    ('/', TokenKind::Operator),
    ('%', TokenKind::Operator),
    ('<', TokenKind::Operator),
    ('>', TokenKind::Operator),
    ('!', TokenKind::Operator),
    ('=', TokenKind::Assignment),
    ('{', TokenKind::BraceOpen),
    ('}', TokenKind::BraceClose),
    ('(', TokenKind::ParenOpen),
    (')', TokenKind::ParenClose),
    ('[', TokenKind::BracketOpen),
    (']', TokenKind::BracketClose),
    (',', TokenKind::Comma),
    (':', TokenKind::Colon),
    ('@', TokenKind::At),
];

/// Characters that terminate an identifier/keyword accumulation run.
fn is_identifier_boundary(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '+' | '-'
                | '*'
                | '/'
                | '%'
                | '<'
                | '>'
                | '!'
                | '='
                | '{'
                | '}'
                | '('
                | ')'
                | '['
                | ']'
                | ','
                | ':'
                | '@'
                | '\''
        )
}

pub struct Lexer<'a> {
    source: &'a [char],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(chars: &'a [char]) -> Self {
        Self {
            source: chars,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn loc(&self, start_offset: usize, start_line: u32, start_column: u32) -> Location {
        Location::new(
            start_offset as u32,
            self.pos as u32,
            start_line,
            start_column,
            self.line,
            self.column,
        )
    }

    /// Lexes the entire source, returning tokens with whitespace/comment/newline tokens
    /// already filtered out (they exist internally only to keep the pass single-character
    /// lookahead and offset-accurate).
    #[must_use]
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.peek().is_some() {
            let token = self.next_token();
            match token.kind {
                TokenKind::Whitespace | TokenKind::Newline => {}
                TokenKind::Comment | TokenKind::MultilineComment => {}
                _ => tokens.push(token),
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        let start_offset = self.pos;
        let start_line = self.line;
        let start_column = self.column;
        let c = self.peek().expect("next_token called at end of input");

        if c == '\n' {
            self.advance();
            return Token::new(TokenKind::Newline, "\n", self.loc(start_offset, start_line, start_column));
        }
        if c.is_whitespace() {
            let mut lexeme = String::new();
            while let Some(c) = self.peek() {
                if c.is_whitespace() && c != '\n' {
                    lexeme.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return Token::new(TokenKind::Whitespace, lexeme, self.loc(start_offset, start_line, start_column));
        }

        if c == '/' && self.peek_at(1) == Some('/') {
            return self.lex_line_comment(start_offset, start_line, start_column);
        }
        if c == '/' && self.peek_at(1) == Some('-') {
            return self.lex_block_comment(start_offset, start_line, start_column);
        }
        if c == '\'' {
            return self.lex_string(start_offset, start_line, start_column);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start_offset, start_line, start_column);
        }

        for (lexeme, kind) in MULTI_CHAR_OPERATORS {
            if self.matches_literal(lexeme) {
                for _ in 0..lexeme.chars().count() {
                    self.advance();
                }
                return Token::new(*kind, *lexeme, self.loc(start_offset, start_line, start_column));
            }
        }

        if !is_identifier_boundary(c) {
            return self.lex_identifier(start_offset, start_line, start_column);
        }

        for (ch, kind) in SINGLE_CHAR_TOKENS {
            if c == *ch {
                self.advance();
                return Token::new(*kind, ch.to_string(), self.loc(start_offset, start_line, start_column));
            }
        }

        self.advance();
        Token::new(TokenKind::Unhandled, c.to_string(), self.loc(start_offset, start_line, start_column))
    }

    fn matches_literal(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn lex_line_comment(&mut self, start_offset: usize, start_line: u32, start_column: u32) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            lexeme.push(c);
            self.advance();
        }
        Token::new(TokenKind::Comment, lexeme, self.loc(start_offset, start_line, start_column))
    }

    fn lex_block_comment(&mut self, start_offset: usize, start_line: u32, start_column: u32) -> Token {
        let mut lexeme = String::new();
        lexeme.push(self.advance().unwrap());
        lexeme.push(self.advance().unwrap());
        while self.peek().is_some() {
            if self.peek() == Some('-') && self.peek_at(1) == Some('/') {
                lexeme.push(self.advance().unwrap());
                lexeme.push(self.advance().unwrap());
                break;
            }
            lexeme.push(self.advance().unwrap());
        }
        Token::new(
            TokenKind::MultilineComment,
            lexeme,
            self.loc(start_offset, start_line, start_column),
        )
    }

    fn lex_string(&mut self, start_offset: usize, start_line: u32, start_column: u32) -> Token {
        let mut lexeme = String::new();
        self.advance();
        while let Some(c) = self.peek() {
            if c == '\'' {
                self.advance();
                break;
            }
            lexeme.push(c);
            self.advance();
        }
        Token::new(TokenKind::String, lexeme, self.loc(start_offset, start_line, start_column))
    }

    /// Digit-run number lexing. A second `.` terminates the run at that digit run rather
    /// than erroring — the dangling `.` and whatever follows become separate tokens on the
    /// next call, matching the original's permissive behavior rather than rejecting it.
    fn lex_number(&mut self, start_offset: usize, start_line: u32, start_column: u32) -> Token {
        let mut lexeme = String::new();
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else if c == '.' && !seen_dot && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
                seen_dot = true;
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, lexeme, self.loc(start_offset, start_line, start_column))
    }

    fn lex_identifier(&mut self, start_offset: usize, start_line: u32, start_column: u32) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if is_identifier_boundary(c) {
                break;
            }
            lexeme.push(c);
            self.advance();
        }
        let kind = if lexeme == "true" || lexeme == "false" {
            TokenKind::Boolean
        } else if LANGUAGE_RESERVED_WORDS.contains(&lexeme.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, self.loc(start_offset, start_line, start_column))
    }
}

/// Convenience entry point: lex a full source string into its final token stream.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    Lexer::new(&chars).lex()
}
