//! Lexer for the "Lello" expression calculator.
//!
//! Whitespace-insensitive; single-char operators `( ) , + - * / % ^`,
//! two-char operators `<= >= == != && ||`, one-char relational `< >`, unary
//! prefixes `+ - ! `, dotted identifiers, integer/real/string literals, and
//! the keywords `true false nil`.

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Le,
    Ge,
    EqEq,
    Ne,
    Lt,
    Gt,
    AndAnd,
    OrOr,
    Bang,
    Ident(String),
    Int(i64),
    Real(f64),
    Str(String),
    True,
    False,
    Nil,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub row: usize,
    pub col: usize,
    /// True if this token was lexed in a position where `+`/`-` must be
    /// binary (i.e. the preceding token was a value, `)`, or identifier).
    /// Cleared after an operator, `(`, or `,`.
    pub left_op: bool,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
    row: usize,
    col: usize,
    left_op: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
            row: 1,
            col: 1,
            left_op: false,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn make(&mut self, kind: TokenKind, row: usize, col: usize, left_op_after: bool) -> Token {
        let tok = Token {
            kind,
            row,
            col,
            left_op: self.left_op,
        };
        self.left_op = left_op_after;
        tok
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, CoreError> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            out.push(tok);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn next_token(&mut self) -> Result<Token, CoreError> {
        self.skip_ws();
        let (row, col) = (self.row, self.col);
        let c = match self.peek_char() {
            None => return Ok(self.make(TokenKind::Eof, row, col, false)),
            Some(c) => c,
        };

        if c.is_ascii_digit() || (c == '.' && self.starts_real_literal()) {
            return self.lex_number(row, col);
        }
        if c == '_' || c.is_alphabetic() {
            return self.lex_ident_or_keyword(row, col);
        }
        if c == '"' {
            return self.lex_string(row, col);
        }

        self.advance();
        let two = |s: &mut Self| s.peek_char();
        let kind = match c {
            '(' => return Ok(self.make(TokenKind::LParen, row, col, false)),
            ')' => return Ok(self.make(TokenKind::RParen, row, col, true)),
            ',' => return Ok(self.make(TokenKind::Comma, row, col, false)),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '!' => {
                if two(self) == Some('=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    return Ok(self.make(TokenKind::Bang, row, col, false));
                }
            }
            '<' => {
                if two(self) == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if two(self) == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '=' => {
                if two(self) == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    return Err(CoreError::Lex {
                        row,
                        col,
                        message: "expected '==', found a lone '='".into(),
                    });
                }
            }
            '&' => {
                if two(self) == Some('&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    return Err(CoreError::Lex {
                        row,
                        col,
                        message: "expected '&&', found a lone '&'".into(),
                    });
                }
            }
            '|' => {
                if two(self) == Some('|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    return Err(CoreError::Lex {
                        row,
                        col,
                        message: "expected '||', found a lone '|'".into(),
                    });
                }
            }
            other => {
                return Err(CoreError::Lex {
                    row,
                    col,
                    message: format!("unexpected character '{other}'"),
                })
            }
        };
        // All the operators above always put us back into "unary/left-op
        // cleared" position.
        Ok(self.make(kind, row, col, false))
    }

    fn starts_real_literal(&mut self) -> bool {
        // We only get here peeking '.', check the char after it.
        let mut iter = self.chars.clone();
        iter.next();
        matches!(iter.peek(), Some((_, c)) if c.is_ascii_digit())
    }

    fn lex_number(&mut self, row: usize, col: usize) -> Result<Token, CoreError> {
        let start = self.current_byte_offset();
        let mut is_real = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !is_real {
                is_real = true;
                self.advance();
            } else {
                break;
            }
        }
        let end = self.current_byte_offset();
        let text = &self.src[start..end];
        if is_real {
            let val: f64 = text.parse().map_err(|_| CoreError::Lex {
                row,
                col,
                message: format!("invalid real literal '{text}'"),
            })?;
            Ok(self.make(TokenKind::Real(val), row, col, true))
        } else {
            let val: i64 = text.parse().map_err(|_| CoreError::Lex {
                row,
                col,
                message: format!("invalid integer literal '{text}'"),
            })?;
            Ok(self.make(TokenKind::Int(val), row, col, true))
        }
    }

    fn lex_ident_or_keyword(&mut self, row: usize, col: usize) -> Result<Token, CoreError> {
        let start = self.current_byte_offset();
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_alphanumeric() || c == '.' {
                // Allow dotted continuation only if followed by an
                // identifier-starting char (spec's dotted identifier rule).
                if c == '.' {
                    let mut iter = self.chars.clone();
                    iter.next();
                    let next_ok =
                        matches!(iter.peek(), Some((_, n)) if n.is_alphabetic() || *n == '_');
                    if !next_ok {
                        break;
                    }
                }
                self.advance();
            } else {
                break;
            }
        }
        let end = self.current_byte_offset();
        let text = &self.src[start..end];
        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            _ => TokenKind::Ident(text.to_string()),
        };
        Ok(self.make(kind, row, col, true))
    }

    fn lex_string(&mut self, row: usize, col: usize) -> Result<Token, CoreError> {
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(CoreError::Lex {
                        row,
                        col,
                        message: "unterminated string literal".into(),
                    })
                }
                Some('"') => break,
                Some(c) => s.push(c),
            }
        }
        Ok(self.make(TokenKind::Str(s), row, col, true))
    }

    fn current_byte_offset(&mut self) -> usize {
        match self.chars.peek() {
            Some((idx, _)) => *idx,
            None => self.src.len(),
        }
    }
}
