use crate::diagnostics::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    KwLet,
    KwConst,
    KwMut,
    KwIf,
    KwElse,
    KwFn,
    KwReturn,
    KwPub,
    KwTrue,
    KwFalse,
    KwExtern,
    KwImport,
    KwAs,
    KwVoid,

    // Operators
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpMod,
    OpEq,
    OpNeq,
    OpLt,
    OpGt,
    OpLte,
    OpGte,
    OpAnd,
    OpOr,
    OpNot,
    OpXor,
    OpShl,
    OpShr,
    OpAssign,
    OpLogAnd,
    OpLogOr,
    OpLogNot,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,
    Ellipsis,
    At,

    // Literals and identifiers
    LitInt,
    LitString,
    Ident,

    // Misc
    Eof,
    Comment,
    Error,
}

impl TokenKind {
    /// Stable name used in verbose token listings and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::KwLet => "kw_let",
            TokenKind::KwConst => "kw_const",
            TokenKind::KwMut => "kw_mut",
            TokenKind::KwIf => "kw_if",
            TokenKind::KwElse => "kw_else",
            TokenKind::KwFn => "kw_fn",
            TokenKind::KwReturn => "kw_return",
            TokenKind::KwPub => "kw_pub",
            TokenKind::KwTrue => "kw_true",
            TokenKind::KwFalse => "kw_false",
            TokenKind::KwExtern => "kw_extern",
            TokenKind::KwImport => "kw_import",
            TokenKind::KwAs => "kw_as",
            TokenKind::KwVoid => "kw_void",
            TokenKind::OpAdd => "op_add",
            TokenKind::OpSub => "op_sub",
            TokenKind::OpMul => "op_mul",
            TokenKind::OpDiv => "op_div",
            TokenKind::OpMod => "op_mod",
            TokenKind::OpEq => "op_eq",
            TokenKind::OpNeq => "op_neq",
            TokenKind::OpLt => "op_lt",
            TokenKind::OpGt => "op_gt",
            TokenKind::OpLte => "op_lte",
            TokenKind::OpGte => "op_gte",
            TokenKind::OpAnd => "op_and",
            TokenKind::OpOr => "op_or",
            TokenKind::OpNot => "op_not",
            TokenKind::OpXor => "op_xor",
            TokenKind::OpShl => "op_shl",
            TokenKind::OpShr => "op_shr",
            TokenKind::OpAssign => "op_assign",
            TokenKind::OpLogAnd => "op_log_and",
            TokenKind::OpLogOr => "op_log_or",
            TokenKind::OpLogNot => "op_log_not",
            TokenKind::LParen => "punct_lparen",
            TokenKind::RParen => "punct_rparen",
            TokenKind::LBrace => "punct_lbrace",
            TokenKind::RBrace => "punct_rbrace",
            TokenKind::LBracket => "punct_lbracket",
            TokenKind::RBracket => "punct_rbracket",
            TokenKind::Comma => "punct_comma",
            TokenKind::Colon => "punct_colon",
            TokenKind::Semicolon => "punct_semicolon",
            TokenKind::Dot => "punct_dot",
            TokenKind::Arrow => "punct_arrow",
            TokenKind::Ellipsis => "punct_ellipsis",
            TokenKind::At => "punct_at",
            TokenKind::LitInt => "lit_int",
            TokenKind::LitString => "lit_string",
            TokenKind::Ident => "ident",
            TokenKind::Eof => "eof",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
        }
    }
}

/// Tokens carry no text of their own; the lexeme is the span's slice of
/// the source.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn lexeme<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start_pos..self.span.end_pos]
    }

    /// One-line rendering for verbose token listings.
    pub fn describe(&self, source: &str) -> String {
        if self.kind == TokenKind::Eof {
            self.kind.name().to_string()
        } else {
            format!("{} {}", self.kind.name(), self.lexeme(source))
        }
    }
}
