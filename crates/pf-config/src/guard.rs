//! Guard expressions: a restricted boolean predicate language over entity
//! attributes.
//!
//! Guards are parsed once at validation time into a small AST and evaluated
//! by walking it.  There is no host-language evaluation of any kind: the
//! only things a guard can do are read attributes, compare them, and combine
//! the results.
//!
//! # Grammar
//!
//! ```text
//! expr     := or
//! or       := and   (("or"  | "||") and)*
//! and      := not   (("and" | "&&") not)*
//! not      := ("not" | "!") not | primary
//! primary  := "(" expr ")" | cmp
//! cmp      := operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand  := number | "-" number | string | "true" | "false" | attr
//! attr     := ident | "entity" "." ident | "entity" "[" string "]"
//! ```
//!
//! A lone operand is tested for truthiness.  `True`/`False` are accepted as
//! aliases for the boolean literals.
//!
//! # Evaluation
//!
//! - `and` / `or` short-circuit, so `entity.vip or entity.age > 18` never
//!   reads `age` for a VIP.
//! - `==` / `!=` across different value types compare unequal (no error).
//! - `<`, `<=`, `>`, `>=` need two numbers, two strings, or two booleans;
//!   anything else is a [`GuardError::TypeMismatch`].
//! - Reading an attribute the entity does not have is a
//!   [`GuardError::MissingAttribute`].

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use pf_core::{AttrValue, Attributes};

// ── Errors ───────────────────────────────────────────────────────────────────

/// A guard that could not be parsed.  Reported as a configuration violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("at offset {offset}: {message}")]
pub struct GuardParseError {
    pub offset:  usize,
    pub message: String,
}

/// A guard that could not be evaluated against a particular entity.
///
/// The interpreter treats every `GuardError` as "guard not satisfied".
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("attribute {0:?} is not set on the entity")]
    MissingAttribute(String),

    #[error("cannot apply `{op}` to {lhs} and {rhs}")]
    TypeMismatch {
        op:  CmpOp,
        lhs: &'static str,
        rhs: &'static str,
    },
}

// ── AST ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Attr(String),
    Literal(AttrValue),
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare { lhs: Operand, op: CmpOp, rhs: Operand },
    Truthy(Operand),
}

/// A parsed guard expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Guard {
    source: String,
    expr:   Expr,
}

impl Guard {
    /// Parse `source` into a guard.
    pub fn parse(source: &str) -> Result<Guard, GuardParseError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0, end: source.len(), depth: 0, terms: 0 };
        let expr = parser.parse_or()?;
        if let Some((offset, tok)) = parser.peek_with_offset() {
            return Err(GuardParseError {
                offset,
                message: format!("unexpected {tok} after end of expression"),
            });
        }
        Ok(Guard { source: source.to_owned(), expr })
    }

    /// The expression text this guard was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attribute names the guard can read, in first-appearance order.
    pub fn referenced_attributes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_attrs(&self.expr, &mut out);
        out
    }

    /// Evaluate against an entity's attribute map.
    pub fn evaluate(&self, attrs: &Attributes) -> Result<bool, GuardError> {
        eval(&self.expr, attrs)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ── Evaluation ───────────────────────────────────────────────────────────────

fn eval(expr: &Expr, attrs: &Attributes) -> Result<bool, GuardError> {
    match expr {
        Expr::Or(a, b)  => Ok(eval(a, attrs)? || eval(b, attrs)?),
        Expr::And(a, b) => Ok(eval(a, attrs)? && eval(b, attrs)?),
        Expr::Not(e)    => Ok(!eval(e, attrs)?),
        Expr::Truthy(operand) => Ok(resolve(operand, attrs)?.is_truthy()),
        Expr::Compare { lhs, op, rhs } => {
            compare(resolve(lhs, attrs)?, *op, resolve(rhs, attrs)?)
        }
    }
}

fn resolve<'a>(operand: &'a Operand, attrs: &'a Attributes) -> Result<&'a AttrValue, GuardError> {
    match operand {
        Operand::Literal(v) => Ok(v),
        Operand::Attr(name) => attrs
            .get(name)
            .ok_or_else(|| GuardError::MissingAttribute(name.clone())),
    }
}

fn compare(lhs: &AttrValue, op: CmpOp, rhs: &AttrValue) -> Result<bool, GuardError> {
    if matches!(op, CmpOp::Eq | CmpOp::Ne) {
        let equal = lhs == rhs;
        return Ok(if op == CmpOp::Eq { equal } else { !equal });
    }

    let ordering = match (lhs, rhs) {
        (AttrValue::Number(a), AttrValue::Number(b)) => a.partial_cmp(b),
        (AttrValue::Text(a), AttrValue::Text(b))     => Some(a.cmp(b)),
        (AttrValue::Bool(a), AttrValue::Bool(b))     => Some(a.cmp(b)),
        _ => {
            return Err(GuardError::TypeMismatch {
                op,
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            });
        }
    };

    // NaN compares false under every ordering operator.
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Eq | CmpOp::Ne => unreachable!("handled above"),
    })
}

fn collect_attrs<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Or(a, b) | Expr::And(a, b) => {
            collect_attrs(a, out);
            collect_attrs(b, out);
        }
        Expr::Not(e) => collect_attrs(e, out),
        Expr::Truthy(o) => push_attr(o, out),
        Expr::Compare { lhs, rhs, .. } => {
            push_attr(lhs, out);
            push_attr(rhs, out);
        }
    }
}

fn push_attr<'a>(operand: &'a Operand, out: &mut Vec<&'a str>) {
    if let Operand::Attr(name) = operand {
        if !out.contains(&name.as_str()) {
            out.push(name);
        }
    }
}

// ── Lexer ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Cmp(CmpOp),
    AndAnd,
    OrOr,
    Bang,
    Minus,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s)  => write!(f, "identifier `{s}`"),
            Token::Number(n) => write!(f, "number `{n}`"),
            Token::Str(s)    => write!(f, "string {s:?}"),
            Token::Cmp(op)   => write!(f, "`{op}`"),
            Token::AndAnd    => f.write_str("`&&`"),
            Token::OrOr      => f.write_str("`||`"),
            Token::Bang      => f.write_str("`!`"),
            Token::Minus     => f.write_str("`-`"),
            Token::LParen    => f.write_str("`(`"),
            Token::RParen    => f.write_str("`)`"),
            Token::LBracket  => f.write_str("`[`"),
            Token::RBracket  => f.write_str("`]`"),
            Token::Dot       => f.write_str("`.`"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, GuardParseError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    let err = |offset: usize, message: String| GuardParseError { offset, message };

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let two = bytes.get(i + 1).copied();
        let token = match (c, two) {
            (b'=', Some(b'=')) => { i += 2; Token::Cmp(CmpOp::Eq) }
            (b'!', Some(b'=')) => { i += 2; Token::Cmp(CmpOp::Ne) }
            (b'<', Some(b'=')) => { i += 2; Token::Cmp(CmpOp::Le) }
            (b'>', Some(b'=')) => { i += 2; Token::Cmp(CmpOp::Ge) }
            (b'&', Some(b'&')) => { i += 2; Token::AndAnd }
            (b'|', Some(b'|')) => { i += 2; Token::OrOr }
            (b'<', _) => { i += 1; Token::Cmp(CmpOp::Lt) }
            (b'>', _) => { i += 1; Token::Cmp(CmpOp::Gt) }
            (b'!', _) => { i += 1; Token::Bang }
            (b'-', _) => { i += 1; Token::Minus }
            (b'(', _) => { i += 1; Token::LParen }
            (b')', _) => { i += 1; Token::RParen }
            (b'[', _) => { i += 1; Token::LBracket }
            (b']', _) => { i += 1; Token::RBracket }
            (b'.', Some(d)) if d.is_ascii_digit() => lex_number(src, &mut i)?,
            (b'.', _) => { i += 1; Token::Dot }
            (b'"' | b'\'', _) => lex_string(src, &mut i)?,
            (d, _) if d.is_ascii_digit() => lex_number(src, &mut i)?,
            (a, _) if a.is_ascii_alphabetic() || a == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                Token::Ident(src[start..i].to_owned())
            }
            (b'=', _) => return Err(err(start, "single `=` is not a comparison; use `==`".into())),
            _ => {
                let ch = src[start..].chars().next().unwrap_or('?');
                return Err(err(start, format!("unexpected character {ch:?}")));
            }
        };
        tokens.push((start, token));
    }
    Ok(tokens)
}

fn lex_number(src: &str, i: &mut usize) -> Result<Token, GuardParseError> {
    let bytes = src.as_bytes();
    let start = *i;
    while *i < bytes.len() && (bytes[*i].is_ascii_digit() || bytes[*i] == b'.') {
        *i += 1;
    }
    let text = &src[start..*i];
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| GuardParseError { offset: start, message: format!("invalid number {text:?}") })
}

fn lex_string(src: &str, i: &mut usize) -> Result<Token, GuardParseError> {
    let start = *i;
    let mut chars = src[start..].char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(GuardParseError { offset: start, message: "expected a string literal".into() });
    };
    let mut out = String::new();
    let mut escaped = false;
    for (off, ch) in chars {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            *i = start + off + ch.len_utf8();
            return Ok(Token::Str(out));
        } else {
            out.push(ch);
        }
    }
    Err(GuardParseError { offset: start, message: "unterminated string literal".into() })
}

// ── Parser ───────────────────────────────────────────────────────────────────

/// Deepest `(` / `not` nesting a guard may use.
pub const MAX_GUARD_NESTING: usize = 64;

/// Most comparisons or bare operands a guard may contain.
pub const MAX_GUARD_TERMS: usize = 256;

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos:    usize,
    /// Offset reported for "unexpected end of expression".
    end:    usize,
    depth:  usize,
    terms:  usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_with_offset(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(o, t)| (*o, t))
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, GuardParseError> {
        Err(GuardParseError { offset: self.offset(), message: message.into() })
    }

    fn is_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == word)
    }

    fn expect(&mut self, want: Token) -> Result<(), GuardParseError> {
        match self.peek() {
            Some(t) if *t == want => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => {
                let msg = format!("expected {want}, found {t}");
                self.error(msg)
            }
            None => self.error(format!("expected {want}, found end of expression")),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, GuardParseError> {
        let mut lhs = self.parse_and()?;
        while self.is_keyword("or") || self.peek() == Some(&Token::OrOr) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, GuardParseError> {
        let mut lhs = self.parse_not()?;
        while self.is_keyword("and") || self.peek() == Some(&Token::AndAnd) {
            self.pos += 1;
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_GUARD_NESTING`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GuardParseError>,
    ) -> Result<T, GuardParseError> {
        if self.depth == MAX_GUARD_NESTING {
            return self.error(format!("nesting deeper than {MAX_GUARD_NESTING} levels"));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn parse_not(&mut self) -> Result<Expr, GuardParseError> {
        if self.is_keyword("not") || self.peek() == Some(&Token::Bang) {
            self.pos += 1;
            let inner = self.nested(Self::parse_not)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, GuardParseError> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.nested(Self::parse_or)?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }

        if self.terms == MAX_GUARD_TERMS {
            return self.error(format!("more than {MAX_GUARD_TERMS} terms"));
        }
        self.terms += 1;
        let lhs = self.parse_operand()?;
        let Some(Token::Cmp(op)) = self.peek().cloned() else {
            return Ok(Expr::Truthy(lhs));
        };
        self.pos += 1;
        let rhs = self.parse_operand()?;
        Ok(Expr::Compare { lhs, op, rhs })
    }

    fn parse_operand(&mut self) -> Result<Operand, GuardParseError> {
        let offset = self.offset();
        match self.bump() {
            Some(Token::Number(n)) => Ok(Operand::Literal(AttrValue::Number(n))),
            Some(Token::Minus) => match self.bump() {
                Some(Token::Number(n)) => Ok(Operand::Literal(AttrValue::Number(-n))),
                _ => Err(GuardParseError { offset, message: "`-` must be followed by a number".into() }),
            },
            Some(Token::Str(s)) => Ok(Operand::Literal(AttrValue::Text(s))),
            Some(Token::Ident(word)) => match word.as_str() {
                "true" | "True"   => Ok(Operand::Literal(AttrValue::Bool(true))),
                "false" | "False" => Ok(Operand::Literal(AttrValue::Bool(false))),
                "and" | "or" | "not" => Err(GuardParseError {
                    offset,
                    message: format!("expected a value, found keyword `{word}`"),
                }),
                "entity" => self.parse_entity_path(),
                _ => Ok(Operand::Attr(word)),
            },
            Some(tok) => Err(GuardParseError { offset, message: format!("expected a value, found {tok}") }),
            None => Err(GuardParseError { offset, message: "expected a value, found end of expression".into() }),
        }
    }

    /// After `entity`: `.name` or `["name"]`.  A bare `entity` reads an
    /// attribute literally named "entity".
    fn parse_entity_path(&mut self) -> Result<Operand, GuardParseError> {
        match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                match self.bump() {
                    Some(Token::Ident(name)) => Ok(Operand::Attr(name)),
                    _ => self.error("expected an attribute name after `entity.`"),
                }
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let name = match self.bump() {
                    Some(Token::Str(name)) => name,
                    _ => return self.error("expected a quoted attribute name inside `entity[...]`"),
                };
                self.expect(Token::RBracket)?;
                Ok(Operand::Attr(name))
            }
            _ => Ok(Operand::Attr("entity".to_owned())),
        }
    }
}
