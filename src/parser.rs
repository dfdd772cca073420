use std::mem;
use std::path::Path;

use crate::ast::{Ast, AstKind, BinOpKind, FnProto, NodeId, NodeKind, TypeExpr, UnOpKind};
use crate::diagnostics::{Diagnostic, Span};
use crate::token::{Token, TokenKind};

pub type ParseResult<T> = Result<T, Box<Diagnostic>>;

/// Parse a token stream into an AST arena, returning the root node.
/// Single-shot: the first syntactic error aborts the parse.
pub fn parse(source: &str, path: &Path, tokens: &[Token]) -> ParseResult<(Ast, NodeId)> {
    Parser::new(source, path, tokens).parse()
}

struct Parser<'a> {
    source: &'a str,
    path: &'a Path,
    tokens: &'a [Token],
    index: usize,
    ast: Ast,
    // Parsed attributes pile up here until the next prototype or extern
    // block claims them.
    attrs: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, path: &'a Path, tokens: &'a [Token]) -> Self {
        Self {
            source,
            path,
            tokens,
            index: 0,
            ast: Ast::new(),
            attrs: Vec::new(),
        }
    }

    fn current(&self) -> Token {
        self.tokens[self.index]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.index];
        if tok.kind != TokenKind::Eof {
            self.index += 1;
        }
        tok
    }

    fn tok_value(&self, tok: Token) -> &'a str {
        tok.lexeme(self.source)
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> Box<Diagnostic> {
        Box::new(Diagnostic::new(message, self.path, span, self.source))
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        let tok = self.current();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_at(
                tok.span,
                format!("expected {what}, found {}", tok.kind.name()),
            ))
        }
    }

    fn require(&mut self, node: Option<NodeId>) -> ParseResult<NodeId> {
        match node {
            Some(node) => Ok(node),
            None => Err(self.error_at(self.current().span, "expected expression")),
        }
    }

    fn parse(mut self) -> ParseResult<(Ast, NodeId)> {
        let first_span = self.current().span;
        let mut children = Vec::new();

        loop {
            let tok_span = self.current().span;
            self.parse_attrs()?;

            if let Some(def) = self.try_parse_fn_def()? {
                children.push(def);
                continue;
            }
            if let Some(ext) = self.try_parse_extern()? {
                children.push(ext);
                continue;
            }
            if let Some(import) = self.try_parse_import()? {
                children.push(import);
                continue;
            }

            if !self.attrs.is_empty() {
                return Err(self.error_at(tok_span, "unexpected attribute"));
            }
            break;
        }

        let tok = self.current();
        if tok.kind != TokenKind::Eof {
            return Err(self.error_at(
                tok.span,
                format!("unexpected token: {}", tok.kind.name()),
            ));
        }

        let span = first_span.merge(&tok.span);
        let root = self.ast.push(NodeKind::Root { children }, span);
        Ok((self.ast, root))
    }

    // ---------- attributes ----------

    fn parse_attrs(&mut self) -> ParseResult<()> {
        while self.current().kind == TokenKind::At {
            self.parse_attr()?;
        }
        Ok(())
    }

    /// `@name("arg")`
    fn parse_attr(&mut self) -> ParseResult<()> {
        let at = self.expect(TokenKind::At, "`@`")?;
        let name_tok = self.expect(TokenKind::Ident, "identifier")?;
        self.expect(TokenKind::LParen, "`(`")?;
        let value_tok = self.expect(TokenKind::LitString, "string literal")?;
        let rparen = self.expect(TokenKind::RParen, "`)`")?;

        let attr = self.ast.push(
            NodeKind::Attr {
                name: self.tok_value(name_tok).to_string(),
                arg: self.unescape(value_tok),
            },
            at.span.merge(&rparen.span),
        );
        self.attrs.push(attr);
        Ok(())
    }

    // ---------- atoms ----------

    fn expect_ident(&mut self) -> ParseResult<NodeId> {
        let tok = self.expect(TokenKind::Ident, "identifier")?;
        Ok(self.ast.push(
            NodeKind::Ident {
                name: self.tok_value(tok).to_string(),
            },
            tok.span,
        ))
    }

    fn make_ident(&mut self, span: Span, name: &str) -> NodeId {
        self.ast.push(
            NodeKind::Ident {
                name: name.to_string(),
            },
            span,
        )
    }

    fn parse_string_node(&mut self) -> ParseResult<NodeId> {
        let tok = self.expect(TokenKind::LitString, "string literal")?;
        let value = self.unescape(tok);
        Ok(self.ast.push(NodeKind::StrLit { value }, tok.span))
    }

    /// Strip the quotes and interpret `\\`, `\r`, `\n`, `\t` and `\"`.
    /// Unknown escapes are dropped.
    fn unescape(&self, tok: Token) -> String {
        let inner = &self.source[tok.span.start_pos + 1..tok.span.end_pos - 1];
        let mut value = String::with_capacity(inner.len());
        let mut escape = false;
        for c in inner.chars() {
            if escape {
                match c {
                    '\\' => value.push('\\'),
                    'r' => value.push('\r'),
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    '"' => value.push('"'),
                    _ => {}
                }
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else {
                value.push(c);
            }
        }
        value
    }

    fn parse_int(&mut self) -> ParseResult<NodeId> {
        let tok = self.expect(TokenKind::LitInt, "integer literal")?;
        Ok(self.ast.push(
            NodeKind::IntLit {
                value: self.tok_value(tok).to_string(),
            },
            tok.span,
        ))
    }

    fn parse_bool(&mut self) -> ParseResult<NodeId> {
        let tok = self.current();
        let value = match tok.kind {
            TokenKind::KwTrue => true,
            TokenKind::KwFalse => false,
            _ => return Err(self.error_at(tok.span, "expected boolean")),
        };
        self.advance();
        Ok(self.ast.push(NodeKind::BoolLit { value }, tok.span))
    }

    // ---------- types ----------

    fn make_prim_type(&mut self, span: Span, name: &str) -> NodeId {
        let ident = self.make_ident(span, name);
        self.ast
            .push(NodeKind::Type(TypeExpr::Primitive { name: ident }), span)
    }

    fn parse_type(&mut self) -> ParseResult<NodeId> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::OpLogNot => Ok(self.make_prim_type(tok.span, "!")),
            TokenKind::KwVoid => Ok(self.make_prim_type(tok.span, "void")),
            TokenKind::Ident => {
                let name = self.tok_value(tok).to_string();
                Ok(self.make_prim_type(tok.span, &name))
            }
            TokenKind::OpMul => {
                let qual = self.advance();
                let is_mut = match qual.kind {
                    TokenKind::KwMut => true,
                    TokenKind::KwConst => false,
                    _ => {
                        return Err(self.error_at(qual.span, "expected `const` or `mut`"));
                    }
                };
                let child = self.parse_type()?;
                Ok(self
                    .ast
                    .push(NodeKind::Type(TypeExpr::Pointer { child, is_mut }), tok.span))
            }
            TokenKind::LBracket => {
                let child = self.parse_type()?;
                self.expect(TokenKind::Semicolon, "`;`")?;
                let size = self.parse_int()?;
                self.expect(TokenKind::RBracket, "`]`")?;
                Ok(self
                    .ast
                    .push(NodeKind::Type(TypeExpr::Array { child, size }), tok.span))
            }
            _ => Err(self.error_at(tok.span, "expected type")),
        }
    }

    // ---------- top-level items ----------

    fn try_parse_import(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::KwImport {
            return Ok(None);
        }
        self.advance();
        let path = self.parse_string_node()?;
        Ok(Some(self.ast.push(NodeKind::Import { path }, tok.span)))
    }

    fn try_parse_extern(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::KwExtern {
            return Ok(None);
        }
        self.advance();

        let attrs = mem::take(&mut self.attrs);
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut fns = Vec::new();
        loop {
            let maybe_attr_span = self.current().span;
            self.parse_attrs()?;

            if self.current().kind == TokenKind::RBrace {
                if !self.attrs.is_empty() {
                    return Err(self.error_at(maybe_attr_span, "unexpected attribute"));
                }
                self.advance();
                break;
            }
            fns.push(self.parse_fn_decl()?);
        }

        Ok(Some(self.ast.push(NodeKind::Extern { attrs, fns }, tok.span)))
    }

    fn parse_fn_decl(&mut self) -> ParseResult<NodeId> {
        let proto = match self.try_parse_fn_proto(true)? {
            Some(proto) => proto,
            None => unreachable!("required prototype parse returned nothing"),
        };
        let span = self.ast.span(proto);
        Ok(self.ast.push(NodeKind::FnDecl { proto }, span))
    }

    fn try_parse_fn_def(&mut self) -> ParseResult<Option<NodeId>> {
        let proto = match self.try_parse_fn_proto(false)? {
            Some(proto) => proto,
            None => return Ok(None),
        };
        let body = self.parse_block()?;
        let span = self.ast.span(proto);
        Ok(Some(self.ast.push(NodeKind::FnDef { proto, body }, span)))
    }

    /// `(pub)? fn <ident> ( <params> ) (-> <type>)?`
    fn try_parse_fn_proto(&mut self, required: bool) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        let is_pub = match tok.kind {
            TokenKind::KwPub => {
                self.advance();
                self.expect(TokenKind::KwFn, "`fn`")?;
                true
            }
            TokenKind::KwFn => {
                self.advance();
                false
            }
            _ => {
                if required {
                    return Err(self.error_at(tok.span, "expected `fn` or `pub fn`"));
                }
                return Ok(None);
            }
        };

        let name = self.expect_ident()?;
        let mut is_variadic = false;
        let params = self.parse_fn_params(&mut is_variadic)?;

        let ret = if self.current().kind == TokenKind::Arrow {
            self.advance();
            self.parse_type()?
        } else {
            // a missing return type is void
            let span = self.current().span;
            self.make_prim_type(span, "void")
        };

        let attrs = mem::take(&mut self.attrs);
        Ok(Some(self.ast.push(
            NodeKind::FnProto(FnProto {
                name,
                params,
                ret,
                attrs,
                is_pub,
                is_variadic,
            }),
            tok.span,
        )))
    }

    fn parse_fn_params(&mut self, is_variadic: &mut bool) -> ParseResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen, "`(`")?;

        if self.current().kind == TokenKind::RParen {
            self.advance();
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        loop {
            let mut expect_end = false;
            match self.try_parse_fn_param()? {
                Some(param) => params.push(param),
                None => {
                    // `...` closes the list
                    *is_variadic = true;
                    expect_end = true;
                }
            }

            let tok = self.advance();
            match tok.kind {
                TokenKind::RParen => return Ok(params),
                _ if expect_end => {
                    return Err(self.error_at(tok.span, "expected `)` after parameter"));
                }
                TokenKind::Comma => {}
                _ => {
                    return Err(self.error_at(
                        tok.span,
                        format!("expected `,`, found {}", tok.kind.name()),
                    ));
                }
            }
        }
    }

    /// `<ident>: <type>`, or `...` which yields `None`.
    fn try_parse_fn_param(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        match tok.kind {
            TokenKind::Ident => {
                let name = self.expect_ident()?;
                self.expect(TokenKind::Colon, "`:`")?;
                let ty = self.parse_type()?;
                Ok(Some(self.ast.push(NodeKind::FnParam { name, ty }, tok.span)))
            }
            TokenKind::Ellipsis => {
                self.advance();
                Ok(None)
            }
            _ => Err(self.error_at(tok.span, "expected identifier or `...`")),
        }
    }

    // ---------- blocks and statements ----------

    fn parse_block(&mut self) -> ParseResult<NodeId> {
        match self.try_parse_block()? {
            Some(block) => Ok(block),
            None => Err(self.error_at(self.current().span, "expected `{`")),
        }
    }

    fn try_parse_block(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::LBrace {
            return Ok(None);
        }
        self.advance();

        let mut children = Vec::new();
        loop {
            let mut stmt = self.try_parse_var_decl()?;
            if stmt.is_none() {
                stmt = self.try_parse_if_or_block()?;
            }
            if stmt.is_none() {
                stmt = self.try_parse_return_or_assign()?;
            }
            let matched = stmt.is_some();
            let stmt = match stmt {
                Some(stmt) => stmt,
                // a block is never empty
                None => self.ast.push(NodeKind::Void, self.current().span),
            };
            children.push(stmt);

            let next = self.current();
            match next.kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Semicolon => {
                    return Err(self.error_at(next.span, "unexpected `;`"));
                }
                _ if !matched => {
                    return Err(self.error_at(
                        next.span,
                        format!("expected `}}`, found {}", next.kind.name()),
                    ));
                }
                _ => {}
            }
        }

        Ok(Some(self.ast.push(NodeKind::Block { children }, tok.span)))
    }

    /// `let (mut)? <ident> ((: <type>) | (= <expr>) | (: <type> = <expr>))`
    fn try_parse_var_decl(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::KwLet {
            return Ok(None);
        }
        self.advance();

        let is_mut = if self.current().kind == TokenKind::KwMut {
            self.advance();
            true
        } else {
            false
        };
        let name = self.expect_ident()?;

        let mut ty = None;
        let mut value = None;
        match self.current().kind {
            TokenKind::Colon => {
                self.advance();
                ty = Some(self.parse_type()?);
                if self.current().kind == TokenKind::OpAssign {
                    self.advance();
                    value = Some(self.parse_expr()?);
                }
            }
            TokenKind::OpAssign => {
                self.advance();
                value = Some(self.parse_expr()?);
            }
            _ => {
                return Err(self.error_at(self.current().span, "expected `:` or `=`"));
            }
        }

        Ok(Some(self.ast.push(
            NodeKind::VarDecl {
                name,
                ty,
                value,
                is_mut,
            },
            tok.span,
        )))
    }

    fn try_parse_if_or_block(&mut self) -> ParseResult<Option<NodeId>> {
        if let Some(if_node) = self.try_parse_if()? {
            return Ok(Some(if_node));
        }
        self.try_parse_block()
    }

    fn try_parse_if(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::KwIf {
            return Ok(None);
        }
        self.advance();

        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_node = self.try_parse_else()?;

        Ok(Some(self.ast.push(
            NodeKind::If {
                cond,
                then_block,
                else_node,
            },
            tok.span,
        )))
    }

    /// `else` followed by another `if` chains as a nested `If` node.
    fn try_parse_else(&mut self) -> ParseResult<Option<NodeId>> {
        if self.current().kind != TokenKind::KwElse {
            return Ok(None);
        }
        self.advance();

        if let Some(if_node) = self.try_parse_if()? {
            return Ok(Some(if_node));
        }
        Ok(Some(self.parse_block()?))
    }

    fn try_parse_return_or_assign(&mut self) -> ParseResult<Option<NodeId>> {
        if let Some(ret) = self.try_parse_return()? {
            return Ok(Some(ret));
        }
        self.try_parse_assign()
    }

    fn try_parse_return(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        if tok.kind != TokenKind::KwReturn {
            return Ok(None);
        }
        self.advance();

        let value = self.try_parse_assign()?;
        Ok(Some(self.ast.push(NodeKind::Return { value }, tok.span)))
    }

    // ---------- expressions, by descending priority ----------

    fn parse_expr(&mut self) -> ParseResult<NodeId> {
        let expr = self.try_parse_assign()?;
        self.require(expr)
    }

    /// `x = <expr>`, a single step, not chainable.
    fn try_parse_assign(&mut self) -> ParseResult<Option<NodeId>> {
        let lhs = match self.try_parse_log_or()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        let tok = self.current();
        if tok.kind != TokenKind::OpAssign {
            return Ok(Some(lhs));
        }
        self.advance();

        let rhs = self.try_parse_log_or()?;
        let rhs = self.require(rhs)?;
        Ok(Some(self.ast.push(
            NodeKind::BinOp {
                op: BinOpKind::Assign,
                lhs,
                rhs,
            },
            tok.span,
        )))
    }

    fn try_parse_log_or(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_log_and()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        while self.current().kind == TokenKind::OpLogOr {
            let tok = self.advance();
            let rhs = self.try_parse_log_and()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(
                NodeKind::BinOp {
                    op: BinOpKind::LogOr,
                    lhs,
                    rhs,
                },
                tok.span,
            );
        }
        Ok(Some(lhs))
    }

    fn try_parse_log_and(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_comparison()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        while self.current().kind == TokenKind::OpLogAnd {
            let tok = self.advance();
            let rhs = self.try_parse_comparison()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(
                NodeKind::BinOp {
                    op: BinOpKind::LogAnd,
                    lhs,
                    rhs,
                },
                tok.span,
            );
        }
        Ok(Some(lhs))
    }

    fn try_parse_comparison(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_bit_or()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        loop {
            let op = match self.current().kind {
                TokenKind::OpEq => BinOpKind::Eq,
                TokenKind::OpNeq => BinOpKind::Neq,
                TokenKind::OpLt => BinOpKind::Lt,
                TokenKind::OpGt => BinOpKind::Gt,
                TokenKind::OpLte => BinOpKind::Lte,
                TokenKind::OpGte => BinOpKind::Gte,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.try_parse_bit_or()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(NodeKind::BinOp { op, lhs, rhs }, tok.span);
        }
        Ok(Some(lhs))
    }

    fn try_parse_bit_or(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_bit_xor()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        while self.current().kind == TokenKind::OpOr {
            let tok = self.advance();
            let rhs = self.try_parse_bit_xor()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(
                NodeKind::BinOp {
                    op: BinOpKind::Or,
                    lhs,
                    rhs,
                },
                tok.span,
            );
        }
        Ok(Some(lhs))
    }

    fn try_parse_bit_xor(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_bit_and()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        while self.current().kind == TokenKind::OpXor {
            let tok = self.advance();
            let rhs = self.try_parse_bit_and()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(
                NodeKind::BinOp {
                    op: BinOpKind::Xor,
                    lhs,
                    rhs,
                },
                tok.span,
            );
        }
        Ok(Some(lhs))
    }

    fn try_parse_bit_and(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_bit_shift()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        while self.current().kind == TokenKind::OpAnd {
            let tok = self.advance();
            let rhs = self.try_parse_bit_shift()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(
                NodeKind::BinOp {
                    op: BinOpKind::And,
                    lhs,
                    rhs,
                },
                tok.span,
            );
        }
        Ok(Some(lhs))
    }

    fn try_parse_bit_shift(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_add()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        loop {
            let op = match self.current().kind {
                TokenKind::OpShl => BinOpKind::Shl,
                TokenKind::OpShr => BinOpKind::Shr,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.try_parse_add()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(NodeKind::BinOp { op, lhs, rhs }, tok.span);
        }
        Ok(Some(lhs))
    }

    fn try_parse_add(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_mul()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        loop {
            let op = match self.current().kind {
                TokenKind::OpAdd => BinOpKind::Add,
                TokenKind::OpSub => BinOpKind::Sub,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.try_parse_mul()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(NodeKind::BinOp { op, lhs, rhs }, tok.span);
        }
        Ok(Some(lhs))
    }

    fn try_parse_mul(&mut self) -> ParseResult<Option<NodeId>> {
        let mut lhs = match self.try_parse_cast()? {
            Some(lhs) => lhs,
            None => return Ok(None),
        };
        loop {
            let op = match self.current().kind {
                TokenKind::OpMul => BinOpKind::Mul,
                TokenKind::OpDiv => BinOpKind::Div,
                TokenKind::OpMod => BinOpKind::Mod,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.try_parse_cast()?;
            let rhs = self.require(rhs)?;
            lhs = self.ast.push(NodeKind::BinOp { op, lhs, rhs }, tok.span);
        }
        Ok(Some(lhs))
    }

    /// `<expr> as <type>`, a single step.
    fn try_parse_cast(&mut self) -> ParseResult<Option<NodeId>> {
        let value = match self.try_parse_unary()? {
            Some(value) => value,
            None => return Ok(None),
        };
        let tok = self.current();
        if tok.kind != TokenKind::KwAs {
            return Ok(Some(value));
        }
        self.advance();

        let ty = self.parse_type()?;
        Ok(Some(self.ast.push(NodeKind::Cast { value, ty }, tok.span)))
    }

    fn try_parse_unary(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        let op = match tok.kind {
            TokenKind::OpSub => UnOpKind::Neg,
            TokenKind::OpNot => UnOpKind::Not,
            TokenKind::OpLogNot => UnOpKind::LogNot,
            _ => return self.try_parse_postfix(),
        };
        self.advance();

        let operand = self.try_parse_unary()?;
        let operand = self.require(operand)?;
        Ok(Some(
            self.ast.push(NodeKind::UnOp { op, operand }, tok.span),
        ))
    }

    /// Calls and array indexing. Only a plain identifier may receive
    /// `()` or `[]`.
    fn try_parse_postfix(&mut self) -> ParseResult<Option<NodeId>> {
        let mut expr = match self.try_parse_primary()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        loop {
            match self.current().kind {
                TokenKind::LParen => {
                    if self.ast.kind(expr) != AstKind::Ident {
                        let span = self.ast.span(expr);
                        return Err(self.error_at(span, "expected identifier"));
                    }
                    let span = self.ast.span(expr);
                    let args = self.parse_call_args()?;
                    expr = self.ast.push(NodeKind::Call { callee: expr, args }, span);
                }
                TokenKind::LBracket => {
                    if self.ast.kind(expr) != AstKind::Ident {
                        let span = self.ast.span(expr);
                        return Err(self.error_at(span, "expected identifier"));
                    }
                    let tok = self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    expr = self
                        .ast
                        .push(NodeKind::ArrayIndex { array: expr, index }, tok.span);
                }
                _ => break,
            }
        }
        Ok(Some(expr))
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen, "`(`")?;

        if self.current().kind == TokenKind::RParen {
            self.advance();
            return Ok(Vec::new());
        }

        let mut args = Vec::new();
        loop {
            args.push(self.parse_expr()?);

            let tok = self.advance();
            match tok.kind {
                TokenKind::RParen => return Ok(args),
                TokenKind::Comma => {}
                _ => {
                    return Err(self.error_at(
                        tok.span,
                        format!("expected `,`, found {}", tok.kind.name()),
                    ));
                }
            }
        }
    }

    fn try_parse_primary(&mut self) -> ParseResult<Option<NodeId>> {
        let tok = self.current();
        match tok.kind {
            TokenKind::LitInt => Ok(Some(self.parse_int()?)),
            TokenKind::LitString => Ok(Some(self.parse_string_node()?)),
            TokenKind::KwTrue | TokenKind::KwFalse => Ok(Some(self.parse_bool()?)),
            TokenKind::KwVoid => {
                self.advance();
                Ok(Some(self.ast.push(NodeKind::Void, tok.span)))
            }
            TokenKind::OpLogNot => {
                self.advance();
                Ok(Some(self.ast.push(NodeKind::NoReturn, tok.span)))
            }
            TokenKind::Ident => Ok(Some(self.expect_ident()?)),
            TokenKind::LParen => {
                // group: ( <expr> )
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(Some(expr))
            }
            _ => Ok(None),
        }
    }
}
