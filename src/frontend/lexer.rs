//! Source text to token stream, including the offside-rule layout tokens.
//!
//! Indentation is tab-based: one tab is one level. A line's leading tabs
//! are compared against a stack of currently-open indentation widths; an
//! increase emits `Indent`, a decrease emits one `Dedent` per level
//! unwound. Layout is suspended while parenthesis nesting is non-zero, so
//! a call's argument list may freely span lines.

use crate::frontend::ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Unit,
    Fn,
    If,
    Else,
    Struct,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Eq,
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,

    Newline,
    Indent,
    Dedent,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Lexer<'src> {
    src: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    paren_depth: u32,
    indent_stack: Vec<usize>,
    at_line_start: bool,
    pending_dedents: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            paren_depth: 0,
            indent_stack: vec![0],
            at_line_start: true,
            pending_dedents: 0,
            finished: false,
        }
    }

    /// Tokenizes the entire source at once. Simpler to reason about and
    /// test than a streaming iterator, and the interpreter never needs
    /// partial-file incremental lexing.
    ///
    /// # Errors
    /// Returns `PARSER-1` if a character is encountered that cannot begin
    /// any valid token (e.g. a lone `.` with no digits, or `@`).
    pub fn tokenize(mut self) -> Result<Vec<Token>, crate::diagnostics::KraitError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn byte_pos(&self) -> usize {
        self.chars.get(self.pos).map_or(self.src.len(), |(i, _)| *i)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn next_token(&mut self) -> Result<Token, crate::diagnostics::KraitError> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            let p = self.byte_pos();
            return Ok(Token {
                kind: TokenKind::Dedent,
                span: Span::new(p, p),
            });
        }

        if self.at_line_start && self.paren_depth == 0 {
            if let Some(tok) = self.handle_line_start()? {
                return Ok(tok);
            }
        }

        self.skip_intra_line_whitespace();

        let start = self.byte_pos();
        let Some(c) = self.peek() else {
            if self.finished {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                });
            }
            self.finished = true;
            // Unwind any remaining indentation before EOF.
            if self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                self.pending_dedents = self.indent_stack.len() - 1;
                self.indent_stack.truncate(1);
                return self.next_token();
            }
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            });
        };

        if c == '\n' {
            self.advance();
            self.at_line_start = true;
            if self.paren_depth > 0 {
                return self.next_token();
            }
            return Ok(Token {
                kind: TokenKind::Newline,
                span: Span::new(start, start + 1),
            });
        }

        if c == '#' {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
            return self.next_token();
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            return self.lex_number(start);
        }

        if c == '"' {
            return self.lex_string(start);
        }

        if c.is_alphabetic() || c == '_' {
            return self.lex_ident_or_keyword(start);
        }

        self.lex_operator(start)
    }

    fn handle_line_start(&mut self) -> Result<Option<Token>, crate::diagnostics::KraitError> {
        let line_start_pos = self.byte_pos();
        let mut width = 0usize;
        loop {
            match self.peek() {
                Some('\t') => {
                    width += 1;
                    self.advance();
                }
                Some(' ') => {
                    self.advance();
                }
                _ => break,
            }
        }
        // A blank line or a comment-only line carries no layout meaning.
        match self.peek() {
            None => {
                self.at_line_start = false;
                return Ok(None);
            }
            Some('\n') | Some('#') => {
                self.at_line_start = false;
                return Ok(None);
            }
            _ => {}
        }

        self.at_line_start = false;
        let current = *self.indent_stack.last().unwrap();
        if width > current {
            self.indent_stack.push(width);
            let p = self.byte_pos();
            return Ok(Some(Token {
                kind: TokenKind::Indent,
                span: Span::new(line_start_pos, p),
            }));
        }
        if width < current {
            let mut count = 0;
            while *self.indent_stack.last().unwrap() > width {
                self.indent_stack.pop();
                count += 1;
            }
            self.pending_dedents = count.saturating_sub(1);
            let p = self.byte_pos();
            return Ok(Some(Token {
                kind: TokenKind::Dedent,
                span: Span::new(line_start_pos, p),
            }));
        }
        Ok(None)
    }

    fn skip_intra_line_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, crate::diagnostics::KraitError> {
        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1) != Some('.') {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let end = self.byte_pos();
        let text = &self.src[start..end];
        let kind = if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(text.parse().unwrap_or(0))
        };
        Ok(Token {
            kind,
            span: Span::new(start, end),
        })
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, crate::diagnostics::KraitError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => break,
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => value.push(other),
                    None => break,
                },
                Some(c) => value.push(c),
            }
        }
        let end = self.byte_pos();
        Ok(Token {
            kind: TokenKind::Str(value),
            span: Span::new(start, end),
        })
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Result<Token, crate::diagnostics::KraitError> {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let end = self.byte_pos();
        let text = &self.src[start..end];
        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "unit" => TokenKind::Unit,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "struct" => TokenKind::Struct,
            other => TokenKind::Ident(other.to_owned()),
        };
        Ok(Token {
            kind,
            span: Span::new(start, end),
        })
    }

    fn lex_operator(&mut self, start: usize) -> Result<Token, crate::diagnostics::KraitError> {
        let c = self.advance().unwrap();
        let two = |this: &mut Self, expect: char, one: TokenKind, two: TokenKind| {
            if this.peek() == Some(expect) {
                this.advance();
                two
            } else {
                one
            }
        };
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '(' => {
                self.paren_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                TokenKind::RParen
            }
            '=' => two(self, '=', TokenKind::Eq, TokenKind::EqEq),
            '!' => two(self, '=', TokenKind::Bang, TokenKind::NotEq),
            '<' => two(self, '=', TokenKind::Lt, TokenKind::LtEq),
            '>' => two(self, '=', TokenKind::Gt, TokenKind::GtEq),
            '&' if self.peek() == Some('&') => {
                self.advance();
                TokenKind::AndAnd
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::OrOr
            }
            other => {
                let end = self.byte_pos();
                return Err(crate::diagnostics::KraitError::UnexpectedToken {
                    lexeme: other.to_string(),
                    span: Span::new(start, end),
                });
            }
        };
        let end = self.byte_pos();
        Ok(Token {
            kind,
            span: Span::new(start, end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().expect("tokenize").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_a_binding_of_an_int_literal() {
        assert_eq!(
            kinds("x = 1\n"),
            vec![
                TokenKind::Ident("x".to_owned()),
                TokenKind::Eq,
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indent_and_dedent_bracket_a_deeper_line() {
        assert_eq!(
            kinds("fn f():\n\t1\nx = 2\n"),
            vec![
                TokenKind::Fn,
                TokenKind::Ident("f".to_owned()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Ident("x".to_owned()),
                TokenKind::Eq,
                TokenKind::Int(2),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newlines_inside_parens_are_not_significant() {
        // layout is suspended while `paren_depth > 0`, so a call's argument
        // list can span lines without emitting Indent/Dedent/Newline.
        assert_eq!(
            kinds("f(\n\t1,\n\t2\n)\n"),
            vec![
                TokenKind::Ident("f".to_owned()),
                TokenKind::LParen,
                TokenKind::Int(1),
                TokenKind::Comma,
                TokenKind::Int(2),
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trailing_underscore_escapes_a_keyword_lookalike() {
        assert_eq!(kinds("if_"), vec![TokenKind::Ident("if_".to_owned()), TokenKind::Eof]);
    }

    #[test]
    fn float_requires_a_digit_on_at_least_one_side_of_the_dot() {
        assert_eq!(kinds("1.5"), vec![TokenKind::Float(1.5), TokenKind::Eof]);
        assert_eq!(kinds(".5"), vec![TokenKind::Float(0.5), TokenKind::Eof]);
        // A bare `.` with no adjoining digit lexes as `Dot`, not a number —
        // it's the parser, not the lexer, that rejects it as unexpected.
        assert_eq!(kinds("."), vec![TokenKind::Dot, TokenKind::Eof]);
    }

    #[test]
    fn string_escapes_are_unescaped() {
        assert_eq!(kinds("\"a\\nb\""), vec![TokenKind::Str("a\nb".to_owned()), TokenKind::Eof]);
    }

    #[test]
    fn two_character_operators_are_longest_match() {
        assert_eq!(
            kinds("== != <= >= && ||"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }
}
