use std::path::Path;

use crate::diagnostics::{Diagnostic, Span};
use crate::token::{Token, TokenKind};

/// Tokenize a whole source file. Lexical errors do not stop the scan:
/// an `error` token is emitted, a diagnostic is recorded, and scanning
/// resumes. The caller drains the diagnostics before parsing.
///
/// Comment tokens are produced while scanning and dropped before the
/// stream is returned; the final token is always `eof` with a
/// zero-length span at the end of input.
pub fn tokenize(source: &str, path: &Path) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source, path);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    tokens.retain(|t| t.kind != TokenKind::Comment);
    (tokens, lexer.diagnostics)
}

fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\n'
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

struct Lexer<'a> {
    source: &'a str,
    src: &'a [u8],
    path: &'a Path,
    pos: usize,
    span: Span,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, path: &'a Path) -> Self {
        Self {
            source,
            src: source.as_bytes(),
            path,
            pos: 0,
            span: Span::new(),
            diagnostics: Vec::new(),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// One byte of lookahead.
    fn first(&self) -> u8 {
        if self.is_eof() {
            0
        } else {
            self.src[self.pos]
        }
    }

    /// Two bytes of lookahead.
    fn second(&self) -> u8 {
        if self.pos + 1 >= self.src.len() {
            0
        } else {
            self.src[self.pos + 1]
        }
    }

    /// Consume one byte, keeping the span's end cursor in step.
    fn bump(&mut self) -> u8 {
        if self.is_eof() {
            return 0;
        }
        let c = self.src[self.pos];
        self.pos += 1;
        if c == b'\n' {
            self.span.inc_end_line();
            self.span.set_end_col(1);
        } else {
            self.span.inc_end_col();
        }
        self.span.inc_end_pos();
        c
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.first()) {
            self.bump();
        }
    }

    /// Lexeme under the span's current start..end window.
    fn raw(&self) -> &'a str {
        &self.source[self.span.start_pos..self.span.end_pos]
    }

    fn error(&mut self, message: &str) {
        self.diagnostics
            .push(Diagnostic::new(message, self.path, self.span, self.source));
    }

    fn next_token(&mut self) -> Token {
        self.eat_while(is_whitespace);
        self.span.update();

        if self.is_eof() {
            return Token::new(TokenKind::Eof, self.span);
        }

        let c = self.bump();
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'@' => TokenKind::At,
            b'.' => {
                if self.first() == b'.' && self.second() == b'.' {
                    self.bump();
                    self.bump();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            b'+' => TokenKind::OpAdd,
            b'-' => {
                if self.first() == b'>' {
                    self.bump();
                    TokenKind::Arrow
                } else {
                    TokenKind::OpSub
                }
            }
            b'*' => TokenKind::OpMul,
            b'/' => {
                if self.first() == b'/' {
                    self.eat_while(|c| c != b'\n');
                    TokenKind::Comment
                } else {
                    TokenKind::OpDiv
                }
            }
            b'%' => TokenKind::OpMod,
            b'^' => TokenKind::OpXor,
            b'~' => TokenKind::OpNot,
            b'&' => {
                if self.first() == b'&' {
                    self.bump();
                    TokenKind::OpLogAnd
                } else {
                    TokenKind::OpAnd
                }
            }
            b'|' => {
                if self.first() == b'|' {
                    self.bump();
                    TokenKind::OpLogOr
                } else {
                    TokenKind::OpOr
                }
            }
            b'!' => {
                if self.first() == b'=' {
                    self.bump();
                    TokenKind::OpNeq
                } else {
                    TokenKind::OpLogNot
                }
            }
            b'=' => {
                if self.first() == b'=' {
                    self.bump();
                    TokenKind::OpEq
                } else {
                    TokenKind::OpAssign
                }
            }
            b'<' => {
                if self.first() == b'=' {
                    self.bump();
                    TokenKind::OpLte
                } else if self.first() == b'<' {
                    self.bump();
                    TokenKind::OpShl
                } else {
                    TokenKind::OpLt
                }
            }
            b'>' => {
                if self.first() == b'=' {
                    self.bump();
                    TokenKind::OpGte
                } else if self.first() == b'>' {
                    self.bump();
                    TokenKind::OpShr
                } else {
                    TokenKind::OpGt
                }
            }
            b'0'..=b'9' => {
                self.eat_while(is_digit);
                TokenKind::LitInt
            }
            c if is_ident_start(c) => {
                self.eat_while(is_ident);
                match self.raw() {
                    "let" => TokenKind::KwLet,
                    "const" => TokenKind::KwConst,
                    "mut" => TokenKind::KwMut,
                    "if" => TokenKind::KwIf,
                    "else" => TokenKind::KwElse,
                    "fn" => TokenKind::KwFn,
                    "return" => TokenKind::KwReturn,
                    "pub" => TokenKind::KwPub,
                    "true" => TokenKind::KwTrue,
                    "false" => TokenKind::KwFalse,
                    "extern" => TokenKind::KwExtern,
                    "import" => TokenKind::KwImport,
                    "as" => TokenKind::KwAs,
                    "void" => TokenKind::KwVoid,
                    _ => TokenKind::Ident,
                }
            }
            b'"' => {
                // backslash escapes a byte, so \" does not close the literal
                while !self.is_eof() && self.first() != b'"' {
                    if self.first() == b'\\' {
                        self.bump();
                    }
                    self.bump();
                }
                if self.first() == b'"' {
                    self.bump();
                    TokenKind::LitString
                } else {
                    self.error("unterminated string literal");
                    TokenKind::Error
                }
            }
            _ => {
                self.error("invalid character");
                TokenKind::Error
            }
        };

        let tok = Token::new(kind, self.span);
        self.span.update();
        tok
    }
}
