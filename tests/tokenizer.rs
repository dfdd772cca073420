use std::path::Path;

use dal::lexer::tokenize;
use dal::token::{Token, TokenKind};

fn lex(source: &str) -> Vec<Token> {
    let (tokens, errors) = tokenize(source, Path::new("test.dal"));
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    tokens
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_a_declaration() {
    let tokens = lex("let x = 10");
    assert_eq!(tokens.len(), 5);
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::KwLet,
            TokenKind::Ident,
            TokenKind::OpAssign,
            TokenKind::LitInt,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].lexeme("let x = 10"), "x");
    assert_eq!(tokens[3].lexeme("let x = 10"), "10");
}

#[test]
fn lexes_a_public_function() {
    let source = "pub fn add(a: u8, b: u8) -> u8 { return a + b }";
    let tokens = lex(source);
    assert_eq!(tokens.len(), 21);
    assert_eq!(tokens[0].kind, TokenKind::KwPub);
    assert_eq!(tokens[12].kind, TokenKind::Arrow);
    assert_eq!(tokens[20].kind, TokenKind::Eof);
}

#[test]
fn eof_token_has_zero_length_span_at_end() {
    let source = "let x = 1\n";
    let tokens = lex(source);
    let eof = tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span.start_pos, source.len());
    assert_eq!(eof.span.end_pos, source.len());
}

#[test]
fn empty_source_yields_single_eof() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].span.len(), 0);
}

#[test]
fn spans_reconstruct_lexemes() {
    let source = "fn main() -> i32 { return 42 }";
    let tokens = lex(source);
    let expected = [
        "fn", "main", "(", ")", "->", "i32", "{", "return", "42", "}",
    ];
    for (tok, want) in tokens.iter().zip(expected.iter()) {
        assert_eq!(tok.lexeme(source), *want);
    }
}

#[test]
fn tokens_partition_the_non_whitespace_input() {
    let source = "let mut total = a + b * 2";
    let tokens = lex(source);
    let rebuilt: String = tokens
        .iter()
        .map(|t| t.lexeme(source))
        .collect::<Vec<_>>()
        .join("");
    let stripped: String = source.chars().filter(|c| *c != ' ').collect();
    assert_eq!(rebuilt, stripped);
}

#[test]
fn recognizes_all_keywords() {
    let source = "let const mut if else fn return pub true false extern import as void";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::KwLet,
            TokenKind::KwConst,
            TokenKind::KwMut,
            TokenKind::KwIf,
            TokenKind::KwElse,
            TokenKind::KwFn,
            TokenKind::KwReturn,
            TokenKind::KwPub,
            TokenKind::KwTrue,
            TokenKind::KwFalse,
            TokenKind::KwExtern,
            TokenKind::KwImport,
            TokenKind::KwAs,
            TokenKind::KwVoid,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn recognizes_multi_byte_operators() {
    let source = "&& || == != <= >= << >> -> ... & | ~ ^ < > = !";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::OpLogAnd,
            TokenKind::OpLogOr,
            TokenKind::OpEq,
            TokenKind::OpNeq,
            TokenKind::OpLte,
            TokenKind::OpGte,
            TokenKind::OpShl,
            TokenKind::OpShr,
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::OpAnd,
            TokenKind::OpOr,
            TokenKind::OpNot,
            TokenKind::OpXor,
            TokenKind::OpLt,
            TokenKind::OpGt,
            TokenKind::OpAssign,
            TokenKind::OpLogNot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_dropped_from_the_stream() {
    let source = "let x = 1 // trailing note\nlet y = 2";
    let tokens = lex(source);
    assert!(tokens.iter().all(|t| t.kind != TokenKind::Comment));
    assert_eq!(tokens.len(), 9);
}

#[test]
fn string_literal_span_includes_quotes() {
    let source = "let s = \"hi\"";
    let tokens = lex(source);
    assert_eq!(tokens[3].kind, TokenKind::LitString);
    assert_eq!(tokens[3].lexeme(source), "\"hi\"");
}

#[test]
fn unterminated_string_is_an_error_token() {
    let source = "let s = \"oops";
    let (tokens, errors) = tokenize(source, Path::new("test.dal"));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("unterminated string literal"));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}

#[test]
fn invalid_character_is_reported_and_skipped() {
    let source = "let # = 1";
    let (tokens, errors) = tokenize(source, Path::new("test.dal"));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("invalid character"));
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::KwLet,
            TokenKind::Error,
            TokenKind::OpAssign,
            TokenKind::LitInt,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn tracks_lines_and_columns() {
    let source = "a\n  bb\n";
    let tokens = lex(source);
    assert_eq!(tokens[0].span.start_line, 1);
    assert_eq!(tokens[0].span.start_col, 1);
    assert_eq!(tokens[1].span.start_line, 2);
    assert_eq!(tokens[1].span.start_col, 3);
    assert_eq!(tokens[1].span.end_col, 5);
}
