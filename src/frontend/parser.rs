//! Recursive-descent, precedence-climbing parser.
//!
//! Besides producing the AST, the parser performs the two static checks
//! the specification assigns to parse time: rebinding a name already bound
//! in the same scope (`PARSER-5`) and referencing a name no enclosing
//! scope can bind (`PARSER-6`). Both checks use a shallow pre-scan of the
//! token stream for each block (see [`scan_block_names`]) so that forward
//! references within a single scope — the common case, since bindings are
//! lazy — resolve without requiring two full parses.

use crate::diagnostics::KraitError;
use crate::frontend::ast::{BinOp, Block, Expr, ExprKind, Ident, ParamList, Span, UnOp};
use crate::frontend::lexer::{Lexer, Token, TokenKind};
use smallvec::smallvec;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Names always in scope: the language's global built-in functions.
const BUILTIN_NAMES: &[&str] = &[
    "println",
    "print",
    "import",
    "import_library",
    "__if_else__",
    "__tuple__",
    "__module__",
    "__struct__",
];

struct Scope {
    known: HashSet<String>,
    bound_so_far: HashMap<String, Span>,
}

pub struct Parser<'src> {
    tokens: Vec<Token>,
    src: &'src str,
    pos: usize,
    scopes: Vec<Scope>,
}

impl<'src> Parser<'src> {
    /// # Errors
    /// Propagates any lexer error (`PARSER-1`).
    pub fn new(src: &'src str) -> Result<Self, KraitError> {
        let tokens = Lexer::new(src).tokenize()?;
        let known = scan_block_names(&tokens, 0, tokens.len());
        Ok(Self {
            tokens,
            src,
            pos: 0,
            scopes: vec![Scope {
                known,
                bound_so_far: HashMap::new(),
            }],
        })
    }

    /// The source text this parser was constructed from, retained so
    /// callers can render a `KraitError`'s snippet without threading the
    /// original string through separately.
    #[must_use]
    pub fn source(&self) -> &str {
        self.src
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, KraitError> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(kind) {
            Ok(self.advance())
        } else {
            self.unexpected()
        }
    }

    fn unexpected<T>(&self) -> Result<T, KraitError> {
        let span = self.current_span();
        let lexeme = lexeme_of(self.peek());
        Err(KraitError::UnexpectedToken { lexeme, span })
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Parses the whole program as a top-level block (no indent wrapper).
    ///
    /// # Errors
    /// Any `PARSER-*` diagnostic encountered while parsing.
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, KraitError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek(), TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn declare(&mut self, ident: &Ident) -> Result<(), KraitError> {
        let scope = self.scopes.last_mut().expect("at least one scope");
        if let Some(original_span) = scope.bound_so_far.get(&ident.name) {
            return Err(KraitError::AlreadyDefined {
                name: ident.name.clone(),
                original_span: *original_span,
                span: ident.span,
            });
        }
        scope.bound_so_far.insert(ident.name.clone(), ident.span);
        Ok(())
    }

    fn check_reference(&self, ident: &Ident) -> Result<(), KraitError> {
        if BUILTIN_NAMES.contains(&ident.name.as_str()) {
            return Ok(());
        }
        for scope in self.scopes.iter().rev() {
            if scope.known.contains(&ident.name) {
                return Ok(());
            }
        }
        Err(KraitError::UnknownIdentifier {
            name: ident.name.clone(),
            span: ident.span,
        })
    }

    fn parse_stmt(&mut self) -> Result<Expr, KraitError> {
        match self.peek() {
            TokenKind::Fn => self.parse_fn_decl(),
            TokenKind::Struct => self.parse_struct_decl(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_expr_stmt(&mut self) -> Result<Expr, KraitError> {
        // `name = ...` (possibly chained) vs. a plain expression.
        if matches!(self.peek(), TokenKind::Ident(_)) && matches!(self.peek_at(1), Some(TokenKind::Eq)) {
            return self.parse_bind();
        }
        self.parse_expr()
    }

    fn parse_bind(&mut self) -> Result<Expr, KraitError> {
        let ident = self.parse_ident()?;
        self.declare(&ident)?;
        let eq = self.expect(&TokenKind::Eq)?;
        // Tolerate the RHS (or a chained alias target) on an indented
        // continuation line: `name =\n\t<rhs>\n`. Anything else standing
        // where the RHS should start — in particular a bare newline with
        // no continuation — means there never was a right-hand side; report
        // it against the `=` itself rather than whatever token follows.
        let continued = matches!(self.peek(), TokenKind::Newline) && matches!(self.peek_at(1), Some(TokenKind::Indent));
        if continued {
            self.advance(); // Newline
            self.advance(); // Indent
        } else if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
            return Err(KraitError::UnexpectedToken {
                lexeme: lexeme_of(&eq.kind),
                span: eq.span,
            });
        }
        let value = if matches!(self.peek(), TokenKind::Ident(_)) && matches!(self.peek_at(1), Some(TokenKind::Eq)) {
            self.parse_bind()?
        } else {
            self.parse_expr()?
        };
        if continued {
            if matches!(self.peek(), TokenKind::Newline) {
                self.advance();
            }
            self.expect(&TokenKind::Dedent)?;
        }
        let span = ident.span.to(value.span);
        Ok(Expr::new(
            ExprKind::Bind {
                name: ident,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_ident(&mut self) -> Result<Ident, KraitError> {
        let span = self.current_span();
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident { name, span })
            }
            _ => self.unexpected(),
        }
    }

    /// The name after a `.`: an ordinary identifier, or an operator
    /// token naming the method every operator lowers to on its left
    /// operand (`(1).-` selects the same `"-"` built-in `1 - 2` calls).
    fn parse_select_name(&mut self) -> Result<Ident, KraitError> {
        let span = self.current_span();
        let name = match self.peek() {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            _ => return self.parse_ident(),
        };
        self.advance();
        Ok(Ident {
            name: name.to_owned(),
            span,
        })
    }

    fn parse_params(&mut self) -> Result<ParamList, KraitError> {
        self.expect(&TokenKind::LParen)?;
        let mut params: ParamList = smallvec![];
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                params.push(self.parse_ident()?);
                if matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    if matches!(self.peek(), TokenKind::RParen) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    fn push_scope(&mut self, body_start: usize, body_end: usize, params: &ParamList) {
        let mut known = scan_block_names(&self.tokens, body_start, body_end);
        for p in params {
            known.insert(p.name.clone());
        }
        self.scopes.push(Scope {
            known,
            bound_so_far: HashMap::new(),
        });
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn parse_fn_decl(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        self.advance(); // fn
        let name = self.parse_ident()?;
        self.declare(&name)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::Colon)?;
        let body_start = self.pos;
        let body_span_end = self.scan_ahead_block_end(body_start);
        self.push_scope(body_start, body_span_end, &params);
        let body = self.parse_block_body()?;
        self.pop_scope();
        let span = start.to(body.last().map_or(name.span, |e| e.span));
        Ok(Expr::new(
            ExprKind::FnDecl {
                name,
                params,
                body: Rc::from(body),
            },
            span,
        ))
    }

    /// `struct Name(self, param*): body` — `self` is a required, literal
    /// first parameter (per grammar) naming the instance inside the body;
    /// it is in scope there but is not a constructor argument, so it is
    /// stripped before the `StructDecl` node is built: `Box(self, value)`
    /// is called as `Box(value)`, not `Box(self, value)`.
    fn parse_struct_decl(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        self.advance(); // struct
        let name = self.parse_ident()?;
        self.declare(&name)?;
        let all_params = self.parse_params()?;
        let Some(self_param) = all_params.first() else {
            return self.unexpected();
        };
        if self_param.name != "self" {
            return Err(KraitError::UnexpectedToken {
                lexeme: self_param.name.clone(),
                span: self_param.span,
            });
        }
        let params: ParamList = all_params[1..].iter().cloned().collect();
        self.expect(&TokenKind::Colon)?;
        let body_start = self.pos;
        let body_span_end = self.scan_ahead_block_end(body_start);
        self.push_scope(body_start, body_span_end, &all_params);
        let body = self.parse_block_body()?;
        self.pop_scope();
        let span = start.to(body.last().map_or(name.span, |e| e.span));
        Ok(Expr::new(
            ExprKind::StructDecl {
                name,
                params,
                body: Rc::from(body),
            },
            span,
        ))
    }

    /// Finds the token index one past the end of the block that starts at
    /// `from`, without consuming anything, so the scope pre-scan can see
    /// exactly this block's tokens before we parse it.
    fn scan_ahead_block_end(&self, from: usize) -> usize {
        let mut i = from;
        if matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::Indent)) {
            let mut depth = 0i32;
            loop {
                match self.tokens.get(i).map(|t| &t.kind) {
                    Some(TokenKind::Indent) => {
                        depth += 1;
                        i += 1;
                    }
                    Some(TokenKind::Dedent) => {
                        depth -= 1;
                        i += 1;
                        if depth == 0 {
                            return i;
                        }
                    }
                    Some(TokenKind::Eof) | None => return i,
                    _ => i += 1,
                }
            }
        } else {
            // Inline body: single statement up to Newline/Eof.
            while !matches!(
                self.tokens.get(i).map(|t| &t.kind),
                Some(TokenKind::Newline) | Some(TokenKind::Eof) | None
            ) {
                i += 1;
            }
            i
        }
    }

    /// Parses the body following a `:` — either an indented block or a
    /// single inline statement.
    fn parse_block_body(&mut self) -> Result<Vec<Expr>, KraitError> {
        if matches!(self.peek(), TokenKind::Indent) {
            self.advance();
            let mut stmts = Vec::new();
            self.skip_newlines();
            while !matches!(self.peek(), TokenKind::Dedent) {
                stmts.push(self.parse_stmt()?);
                self.skip_newlines();
            }
            self.advance(); // Dedent
            Ok(stmts)
        } else if matches!(self.peek(), TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof) {
            Ok(Vec::new())
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, KraitError> {
        match self.peek() {
            TokenKind::If => self.parse_if(),
            TokenKind::LParen if self.looks_like_anon_fn() => self.parse_anon_fn(),
            _ => self.parse_or(),
        }
    }

    fn looks_like_anon_fn(&self) -> bool {
        let mut i = self.pos + 1;
        loop {
            match self.tokens.get(i).map(|t| &t.kind) {
                Some(TokenKind::RParen) => {
                    return matches!(self.tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::Colon));
                }
                Some(TokenKind::Ident(_)) => {
                    i += 1;
                    match self.tokens.get(i).map(|t| &t.kind) {
                        Some(TokenKind::Comma) => i += 1,
                        Some(TokenKind::RParen) => continue,
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }
    }

    fn parse_anon_fn(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        let params = self.parse_params()?;
        self.expect(&TokenKind::Colon)?;
        let body_start = self.pos;
        let body_span_end = self.scan_ahead_block_end(body_start);
        self.push_scope(body_start, body_span_end, &params);
        let body = self.parse_block_body()?;
        self.pop_scope();
        let span = start.to(body.last().map_or(start, |e| e.span));
        Ok(Expr::new(
            ExprKind::AnonFn {
                params,
                body: Rc::from(body),
            },
            span,
        ))
    }

    fn parse_if(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        let mut branches = Vec::new();
        self.advance(); // if
        let cond = self.parse_or()?;
        self.expect(&TokenKind::Colon)?;
        let then_start = self.pos;
        let then_end = self.scan_ahead_block_end(then_start);
        self.push_scope(then_start, then_end, &smallvec![]);
        let then_body = self.parse_block_body()?;
        self.pop_scope();
        branches.push((cond, Rc::from(then_body) as Block));

        let mut else_branch = None;
        loop {
            self.skip_newlines_if_else_follows();
            if matches!(self.peek(), TokenKind::Else) {
                self.advance();
                if matches!(self.peek(), TokenKind::If) {
                    self.advance();
                    let cond = self.parse_or()?;
                    self.expect(&TokenKind::Colon)?;
                    let s = self.pos;
                    let e = self.scan_ahead_block_end(s);
                    self.push_scope(s, e, &smallvec![]);
                    let body = self.parse_block_body()?;
                    self.pop_scope();
                    branches.push((cond, Rc::from(body) as Block));
                } else {
                    self.expect(&TokenKind::Colon)?;
                    let s = self.pos;
                    let e = self.scan_ahead_block_end(s);
                    self.push_scope(s, e, &smallvec![]);
                    let body = self.parse_block_body()?;
                    self.pop_scope();
                    else_branch = Some(Rc::from(body) as Block);
                    break;
                }
            } else {
                break;
            }
        }

        let end_span = else_branch
            .as_ref()
            .and_then(|b| b.last().map(|e| e.span))
            .or_else(|| branches.last().and_then(|(_, b)| b.last().map(|e| e.span)))
            .unwrap_or(start);
        Ok(Expr::new(
            ExprKind::If {
                branches,
                else_branch,
            },
            start.to(end_span),
        ))
    }

    /// `else` after an indented block appears at the same indentation as
    /// the `if`, i.e. following a `Dedent`/`Newline`; skip the layout
    /// tokens that separate the prior block from it without crossing into
    /// a sibling statement.
    fn skip_newlines_if_else_follows(&mut self) {
        let save = self.pos;
        let mut i = self.pos;
        while matches!(
            self.tokens.get(i).map(|t| &t.kind),
            Some(TokenKind::Newline) | Some(TokenKind::Dedent)
        ) {
            i += 1;
        }
        if matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::Else)) {
            self.pos = i;
        } else {
            self.pos = save;
        }
    }

    fn parse_or(&mut self) -> Result<Expr, KraitError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op: BinOp::Or,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, KraitError> {
        let mut lhs = self.parse_cmp()?;
        while matches!(self.peek(), TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_cmp()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op: BinOp::And,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> Result<Expr, KraitError> {
        let mut lhs = self.parse_add()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_add()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Expr, KraitError> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, KraitError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        let op = match self.peek() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.to(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, KraitError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if matches!(self.peek(), TokenKind::Comma) {
                                self.advance();
                                if matches!(self.peek(), TokenKind::RParen) {
                                    break;
                                }
                            } else {
                                break;
                            }
                        }
                    }
                    let end = self.current_span();
                    self.expect(&TokenKind::RParen)?;
                    let span = expr.span.to(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.parse_select_name()?;
                    if let Some(known) = static_field_names(&expr.kind) {
                        if !known.contains(&name.name.as_str()) {
                            return Err(KraitError::UnknownStaticField {
                                field: name.name,
                                span: name.span,
                            });
                        }
                    }
                    let span = expr.span.to(name.span);
                    expr = Expr::new(
                        ExprKind::Select {
                            receiver: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, KraitError> {
        let span = self.current_span();
        match self.peek().clone() {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::Int(v), span))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::Float(v), span))
            }
            TokenKind::Str(ref s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::new(ExprKind::Str(s), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::Bool(false), span))
            }
            TokenKind::Unit => {
                self.advance();
                Ok(Expr::new(ExprKind::Unit, span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let ident = Ident { name, span };
                self.check_reference(&ident)?;
                Ok(Expr::new(ExprKind::Ident(ident.name), span))
            }
            TokenKind::LParen => self.parse_paren_or_tuple(),
            _ => self.unexpected(),
        }
    }

    fn parse_paren_or_tuple(&mut self) -> Result<Expr, KraitError> {
        let start = self.current_span();
        self.advance(); // (

        if matches!(self.peek(), TokenKind::RParen) {
            return self.unexpected();
        }
        if matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            let end = self.current_span();
            self.expect(&TokenKind::RParen)?;
            return Ok(Expr::new(ExprKind::Tuple { elements: Vec::new() }, start.to(end)));
        }

        let first = self.parse_expr()?;
        if matches!(self.peek(), TokenKind::RParen) {
            let end = self.current_span();
            self.advance();
            return Ok(Expr::new(first.kind, start.to(end)));
        }

        let mut elements = vec![first];
        let mut trailing_comma = false;
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            trailing_comma = true;
            if matches!(self.peek(), TokenKind::RParen) {
                break;
            }
            elements.push(self.parse_expr()?);
            trailing_comma = false;
        }
        let _ = trailing_comma;
        let end = self.current_span();
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(ExprKind::Tuple { elements }, start.to(end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<Expr> {
        Parser::new(src).expect("lex").parse_program().expect("parse")
    }

    #[test]
    fn binary_addition_is_left_associative() {
        let stmts = parse("1 + 2 + 3\n");
        let ExprKind::Binary { op: BinOp::Add, lhs, rhs } = &stmts[0].kind else {
            panic!("expected a top-level Add: {:?}", stmts[0].kind);
        };
        assert!(matches!(rhs.kind, ExprKind::Int(3)));
        assert!(matches!(&lhs.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn assignment_chains_are_right_associative() {
        let stmts = parse("a = b = 1\n");
        let ExprKind::Bind { name, value } = &stmts[0].kind else {
            panic!("expected a Bind: {:?}", stmts[0].kind);
        };
        assert_eq!(name.name, "a");
        assert!(matches!(&value.kind, ExprKind::Bind { name, .. } if name.name == "b"));
    }

    #[test]
    fn empty_parens_is_a_parse_error() {
        assert!(Parser::new("()\n").expect("lex").parse_program().is_err());
    }

    #[test]
    fn comma_alone_is_the_empty_tuple() {
        let stmts = parse("(,)\n");
        assert!(matches!(&stmts[0].kind, ExprKind::Tuple { elements } if elements.is_empty()));
    }

    #[test]
    fn single_element_with_trailing_comma_is_a_one_tuple() {
        let stmts = parse("(1,)\n");
        assert!(matches!(&stmts[0].kind, ExprKind::Tuple { elements } if elements.len() == 1));
    }

    #[test]
    fn parens_around_one_expression_with_no_comma_is_just_that_expression() {
        let stmts = parse("(1)\n");
        assert!(matches!(stmts[0].kind, ExprKind::Int(1)));
    }

    #[test]
    fn struct_decl_strips_self_from_the_constructor_parameter_list() {
        let stmts = parse("struct Box(self, value):\n\n");
        let ExprKind::StructDecl { name, params, .. } = &stmts[0].kind else {
            panic!("expected a StructDecl: {:?}", stmts[0].kind);
        };
        assert_eq!(name.name, "Box");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "value");
    }

    #[test]
    fn unknown_identifier_reference_is_parser_6() {
        let err = Parser::new("println(nope)\n").expect("lex").parse_program().unwrap_err();
        assert!(matches!(err, KraitError::UnknownIdentifier { name, .. } if name == "nope"));
    }

    #[test]
    fn rebinding_in_the_same_scope_is_parser_5() {
        let err = Parser::new("x = 1\nx = 2\n").expect("lex").parse_program().unwrap_err();
        assert!(matches!(err, KraitError::AlreadyDefined { name, .. } if name == "x"));
    }

    #[test]
    fn a_bind_with_no_right_hand_side_reports_the_equals_sign() {
        let err = Parser::new("value =\n").expect("lex").parse_program().unwrap_err();
        assert!(matches!(err, KraitError::UnexpectedToken { lexeme, .. } if lexeme == "="));
    }

    #[test]
    fn a_binds_right_hand_side_may_appear_on_an_indented_continuation_line() {
        let stmts = parse("message1 =\n\t\"Hello, world!\"\n\nx = 1\n");
        let ExprKind::Bind { name, value } = &stmts[0].kind else {
            panic!("expected a Bind: {:?}", stmts[0].kind);
        };
        assert_eq!(name.name, "message1");
        assert!(matches!(&value.kind, ExprKind::Str(s) if s == "Hello, world!"));
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn a_chained_alias_target_may_also_appear_on_a_continuation_line() {
        let stmts = parse("a =\n\tb =\n\t\t1\n\nx = 2\n");
        let ExprKind::Bind { name, value } = &stmts[0].kind else {
            panic!("expected a Bind: {:?}", stmts[0].kind);
        };
        assert_eq!(name.name, "a");
        assert!(matches!(&value.kind, ExprKind::Bind { name, .. } if name.name == "b"));
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn selecting_an_operator_by_name_off_a_literal_parses_as_a_select() {
        let stmts = parse("(1).-\n");
        let ExprKind::Select { receiver, name } = &stmts[0].kind else {
            panic!("expected a Select: {:?}", stmts[0].kind);
        };
        assert_eq!(name.name, "-");
        assert!(matches!(receiver.kind, ExprKind::Int(1)));
    }
}

fn lexeme_of(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Int(v) => v.to_string(),
        TokenKind::Float(v) => v.to_string(),
        TokenKind::Str(s) => format!("{s:?}"),
        TokenKind::Ident(s) => s.clone(),
        TokenKind::True => "true".into(),
        TokenKind::False => "false".into(),
        TokenKind::Unit => "unit".into(),
        TokenKind::Fn => "fn".into(),
        TokenKind::If => "if".into(),
        TokenKind::Else => "else".into(),
        TokenKind::Struct => "struct".into(),
        TokenKind::Plus => "+".into(),
        TokenKind::Minus => "-".into(),
        TokenKind::Star => "*".into(),
        TokenKind::Slash => "/".into(),
        TokenKind::Percent => "%".into(),
        TokenKind::EqEq => "==".into(),
        TokenKind::NotEq => "!=".into(),
        TokenKind::Lt => "<".into(),
        TokenKind::LtEq => "<=".into(),
        TokenKind::Gt => ">".into(),
        TokenKind::GtEq => ">=".into(),
        TokenKind::AndAnd => "&&".into(),
        TokenKind::OrOr => "||".into(),
        TokenKind::Bang => "!".into(),
        TokenKind::Eq => "=".into(),
        TokenKind::Dot => ".".into(),
        TokenKind::Comma => ",".into(),
        TokenKind::Colon => ":".into(),
        TokenKind::LParen => "(".into(),
        TokenKind::RParen => ")".into(),
        TokenKind::Newline => "newline".into(),
        TokenKind::Indent => "indent".into(),
        TokenKind::Dedent => "dedent".into(),
        TokenKind::Eof => "end of file".into(),
    }
}

/// The fixed field set for a literal expression kind, when the kind is
/// statically known from the literal alone — used to raise `PARSER-7`
/// instead of waiting for `RUNTIME-9` at evaluation time. `None` means the
/// receiver's type can't be determined without running the program (e.g.
/// an identifier or a call result), so the check is deferred to runtime.
fn static_field_names(kind: &ExprKind) -> Option<&'static [&'static str]> {
    match kind {
        ExprKind::Int(_) => Some(&[
            "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "to_str", "to_character",
        ]),
        ExprKind::Float(_) => Some(&["+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "to_str"]),
        ExprKind::Bool(_) => Some(&["&&", "||", "!", "==", "!=", "to_str"]),
        ExprKind::Str(_) => Some(&[
            "length", "+", "==", "!=", "to_str", "get", "slice", "split", "strip", "codepoint",
        ]),
        ExprKind::Unit => Some(&["==", "!=", "to_str"]),
        ExprKind::Tuple { .. } => Some(&["length", "get", "+", "*", "slice", "==", "!=", "to_str"]),
        _ => None,
    }
}

/// Shallow pre-scan of `tokens[start..end]` collecting the names this
/// block binds at its own level: value bindings (including right-
/// associative chains `a = b = expr`), `fn` declarations, and `struct`
/// declarations. Does not descend into nested blocks' own bindings — those
/// belong to their own scope.
fn scan_block_names(tokens: &[Token], start: usize, end: usize) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut i = start;
    let mut depth: i32 = 0;

    while i < end {
        match &tokens[i].kind {
            TokenKind::Indent => {
                depth += 1;
                i += 1;
            }
            TokenKind::Dedent => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                i += 1;
            }
            TokenKind::Newline if depth == 0 => {
                i += 1;
            }
            TokenKind::Eof => break,
            _ if depth == 0 => {
                // Chained binds: Ident Eq Ident Eq ... expr
                while let (Some(TokenKind::Ident(name)), Some(TokenKind::Eq)) =
                    (tokens.get(i).map(|t| &t.kind), tokens.get(i + 1).map(|t| &t.kind))
                {
                    names.insert(name.clone());
                    i += 2;
                }
                match tokens.get(i).map(|t| &t.kind) {
                    Some(TokenKind::Fn) => {
                        if let Some(TokenKind::Ident(name)) = tokens.get(i + 1).map(|t| &t.kind) {
                            names.insert(name.clone());
                        }
                    }
                    Some(TokenKind::Struct) => {
                        if let Some(TokenKind::Ident(name)) = tokens.get(i + 1).map(|t| &t.kind) {
                            names.insert(name.clone());
                        }
                    }
                    _ => {}
                }
                // Skip the remainder of this statement, tracking nested
                // Indent/Dedent depth so a multi-line `fn`/`struct`/`if`
                // body doesn't confuse the next statement's boundary.
                loop {
                    if i >= end {
                        break;
                    }
                    match &tokens[i].kind {
                        TokenKind::Indent => {
                            depth += 1;
                            i += 1;
                        }
                        TokenKind::Dedent => {
                            if depth == 0 {
                                break;
                            }
                            depth -= 1;
                            i += 1;
                        }
                        TokenKind::Newline if depth == 0 => {
                            i += 1;
                            break;
                        }
                        TokenKind::Eof => break,
                        _ => i += 1,
                    }
                }
            }
            _ => i += 1,
        }
    }
    names
}
