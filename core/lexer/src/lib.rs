#![warn(clippy::pedantic)]

pub mod lexer;
pub mod token;

pub use lexer::{lex, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        lex(source).into_iter().map(|t| t.lexeme).collect()
    }

    #[test]
    fn lexes_simple_assignment() {
        let tokens = lex("x = 5");
        assert_eq!(kinds("x = 5"), vec![Identifier, Assignment, Number]);
        assert_eq!(tokens[2].lexeme, "5");
    }

    #[test]
    fn multi_char_operators_never_split() {
        assert_eq!(kinds("a == b"), vec![Identifier, Operator, Identifier]);
        assert_eq!(lexemes("a == b")[1], "==");
        assert_eq!(kinds("2 ** 3"), vec![Number, Operator, Number]);
        assert_eq!(lexemes("2 ** 3")[1], "**");
        assert_eq!(kinds("a != b"), vec![Identifier, Operator, Identifier]);
    }

    #[test]
    fn func_declaration_arrow_is_not_two_operators() {
        assert_eq!(kinds("x: number -> 1"), vec![Identifier, Colon, Identifier, FuncDeclaration, Number]);
    }

    #[test]
    fn strings_are_delimited_by_single_quotes() {
        let tokens = lex("'hello world'");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].lexeme, "hello world");
    }

    #[test]
    fn line_comments_are_dropped_but_newline_boundary_respected() {
        let tokens = lex("x = 1 // comment\ny = 2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Identifier, Assignment, Number, Identifier, Assignment, Number]
        );
    }

    #[test]
    fn block_comments_are_dropped() {
        let tokens = lex("x /- this is\nmultiline -/ = 1");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Identifier, Assignment, Number]);
    }

    #[test]
    fn keywords_and_booleans_are_reclassified() {
        assert_eq!(kinds("if true"), vec![Keyword, Boolean]);
        assert_eq!(kinds("capsule Foo"), vec![Keyword, Identifier]);
    }

    #[test]
    fn number_with_single_decimal_point() {
        let tokens = lex("3.14");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Number);
        assert_eq!(tokens[0].lexeme, "3.14");
    }

    #[test]
    fn number_with_second_decimal_point_terminates_run() {
        // "1.2.3" lexes as Number("1.2"), then the dangling "." becomes Unhandled, then
        // Number("3") -- the original's permissive, non-throwing behavior.
        let tokens = lex("1.2.3");
        assert_eq!(tokens[0].kind, Number);
        assert_eq!(tokens[0].lexeme, "1.2");
        assert_eq!(tokens[1].kind, Unhandled);
        assert_eq!(tokens[1].lexeme, ".");
        assert_eq!(tokens[2].kind, Number);
        assert_eq!(tokens[2].lexeme, "3");
    }

    #[test]
    fn unhandled_characters_do_not_panic() {
        let tokens = lex("x = ?");
        assert_eq!(tokens.last().unwrap().kind, Unhandled);
        assert_eq!(tokens.last().unwrap().lexeme, "?");
    }

    #[test]
    fn token_positions_are_one_based_and_monotonic() {
        let tokens = lex("foo\nbar = 1");
        for t in &tokens {
            assert!(t.location.start_line >= 1);
            assert!(t.location.start_column >= 1);
        }
        let mut last = (0u32, 0u32);
        for t in &tokens {
            let cur = (t.location.start_line, t.location.start_column);
            assert!(cur >= last, "token positions must be non-decreasing");
            last = cur;
        }
    }

    #[test]
    fn brackets_braces_and_punctuation() {
        assert_eq!(
            kinds("{ [1, 2] }"),
            vec![BraceOpen, BracketOpen, Number, Comma, Number, BracketClose, BraceClose]
        );
    }

    #[test]
    fn at_symbol_is_its_own_token() {
        assert_eq!(kinds("@Struct"), vec![At, Identifier]);
    }

    #[test]
    fn lexeme_concatenation_reproduces_source_modulo_dropped_trivia() {
        let source = "capsule Main {\n  x = 1 + 2\n}";
        let tokens = lex(source);
        let non_trivia: String = tokens.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>().join("");
        assert!(non_trivia.contains("capsule"));
        assert!(non_trivia.contains('+'));
    }
}
