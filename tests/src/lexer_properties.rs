//! Lexer invariants (SPEC_FULL.md §8).

use theta_lexer::token::TokenKind;

#[test]
fn multi_character_operators_are_not_split() {
    let tokens = theta_lexer::lex("a == b");
    let operator = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Operator)
        .expect("an operator token");
    assert_eq!(operator.lexeme, "==");
}

#[test]
fn compound_assignment_operators_are_not_split() {
    let tokens = theta_lexer::lex("x += 1");
    let operators: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Operator).collect();
    assert_eq!(operators.len(), 1, "expected one `+=` operator token, got {operators:?}");
    assert_eq!(operators[0].lexeme, "+=");
}

#[test]
fn token_positions_are_one_based_and_nondecreasing() {
    let tokens = theta_lexer::lex("capsule T {\n  x = 1\n}");
    let mut last = (0u32, 0u32);
    for token in &tokens {
        assert!(token.location.start_line >= 1);
        assert!(token.location.start_column >= 1);
        let here = (token.location.start_line, token.location.start_column);
        assert!(here >= last, "token {token:?} is out of order relative to {last:?}");
        last = here;
    }
}

#[test]
fn lexing_a_capsule_produces_a_capsule_keyword_token() {
    let tokens = theta_lexer::lex("capsule T { main = () -> 1 }");
    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Keyword && t.lexeme == "capsule"));
}
