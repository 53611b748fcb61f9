//! Infix expression syntax for building compute graphs.
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := '-' unary | power
//! power := atom ('^' unary)?
//! atom  := number | ident | ident '(' expr ')' | '(' expr ')'
//! ```
//!
//! `^` binds tighter than unary minus and is right-associative
//! (`-x^2` is `-(x^2)`, `2^3^2` is `2^9`). Functions: `exp`, `log`, `sin`,
//! `cos`, `neg`. Every other identifier is a variable.
//!
//! Parentheses, function calls, unary minus and exponents nest at most
//! [`MAX_NESTING`] levels deep; deeper input is rejected with
//! [`ParseErrorKind::TooDeep`] instead of exhausting the stack.

use crate::graph::dag::Dag;
use crate::graph::error::{ParseError, ParseErrorKind};
use crate::graph::op::{BinaryOp, OpId, UnaryOp};

/// Deepest accepted nesting of `(`, `f(`, unary `-` and `^`.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Sym(char),
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(v) => format!("{}", v),
            Token::Ident(s) => s.clone(),
            Token::Sym(c) => c.to_string(),
            Token::End => "end of input".to_owned(),
        }
    }
}

struct Parser<'a, 'd> {
    src: &'a str,
    pos: usize,
    /// Current token and its start offset.
    tok: Token,
    tok_start: usize,
    /// Current nesting level, bounded by `MAX_NESTING`.
    depth: usize,
    dag: &'d mut Dag,
}

/// Parse `src` into `dag`, returning the root node.
pub fn parse(dag: &mut Dag, src: &str) -> Result<OpId, ParseError> {
    let mut p = Parser { src, pos: 0, tok: Token::End, tok_start: 0, depth: 0, dag };
    p.advance()?;
    let root = p.expr()?;
    if p.tok != Token::End {
        return Err(p.unexpected());
    }
    Ok(root)
}

impl<'a, 'd> Parser<'a, 'd> {
    fn error(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { offset, kind }
    }

    fn unexpected(&self) -> ParseError {
        match self.tok {
            Token::End => self.error(self.tok_start, ParseErrorKind::UnexpectedEnd),
            _ => self.error(self.tok_start, ParseErrorKind::UnexpectedToken(self.tok.describe())),
        }
    }

    /// Lex the next token into `self.tok`.
    fn advance(&mut self) -> Result<(), ParseError> {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        self.tok_start = self.pos;
        if self.pos >= bytes.len() {
            self.tok = Token::End;
            return Ok(());
        }

        let c = bytes[self.pos];
        if c.is_ascii_digit() || c == b'.' {
            self.tok = Token::Num(self.number()?);
        } else if c.is_ascii_alphabetic() || c == b'_' {
            let start = self.pos;
            while self.pos < bytes.len()
                && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }
            self.tok = Token::Ident(self.src[start..self.pos].to_owned());
        } else if b"+-*/^()".contains(&c) {
            self.pos += 1;
            self.tok = Token::Sym(c as char);
        } else {
            let ch = self.src[self.pos..].chars().next().unwrap_or('?');
            return Err(self.error(self.pos, ParseErrorKind::UnexpectedChar(ch)));
        }
        Ok(())
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && (bytes[self.pos].is_ascii_digit() || bytes[self.pos] == b'.') {
            self.pos += 1;
        }
        if self.pos < bytes.len() && (bytes[self.pos] == b'e' || bytes[self.pos] == b'E') {
            let mut j = self.pos + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                self.pos = j;
            }
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map_err(|_| self.error(start, ParseErrorKind::BadNumber(text.to_owned())))
    }

    fn eat(&mut self, sym: char) -> Result<bool, ParseError> {
        if self.tok == Token::Sym(sym) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, sym: char) -> Result<(), ParseError> {
        if self.eat(sym)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(self.tok_start, ParseErrorKind::TooDeep));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<OpId, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat('+')? {
                BinaryOp::Add
            } else if self.eat('-')? {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = self.dag.binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<OpId, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat('*')? {
                BinaryOp::Mul
            } else if self.eat('/')? {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = self.dag.binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<OpId, ParseError> {
        if self.eat('-')? {
            let arg = self.nested(Self::unary)?;
            return Ok(self.dag.neg(arg));
        }
        self.power()
    }

    fn power(&mut self) -> Result<OpId, ParseError> {
        let base = self.atom()?;
        if self.eat('^')? {
            let exponent = self.nested(Self::unary)?;
            return Ok(self.dag.pow(base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<OpId, ParseError> {
        match self.tok.clone() {
            Token::Num(v) => {
                self.advance()?;
                Ok(self.dag.lit(v))
            }
            Token::Ident(name) => {
                let start = self.tok_start;
                self.advance()?;
                if self.eat('(')? {
                    let op = UnaryOp::from_function_name(&name)
                        .ok_or_else(|| self.error(start, ParseErrorKind::UnknownFunction(name.clone())))?;
                    let arg = self.nested(Self::expr)?;
                    self.expect(')')?;
                    Ok(self.dag.unary(op, arg))
                } else {
                    Ok(self.dag.var(&name))
                }
            }
            Token::Sym('(') => {
                self.advance()?;
                let inner = self.nested(Self::expr)?;
                self.expect(')')?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }
}
