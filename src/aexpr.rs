//! Arithmetic expressions over [`Var`]s.
//!
//! [`AExpr`] is an immutable tree built from integer literals, variables,
//! negation, addition, subtraction and multiplication. Expressions are built
//! either with the constructor functions, with the overloaded operators, or by
//! parsing the small infix grammar accepted by [`AExpr::parse`]:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary ('*' unary)*
//! unary  := '-' unary | atom
//! atom   := integer | identifier ['\''] | '(' expr ')'
//! ```
//!
//! A minus sign written directly in front of digits in a unary position is
//! read as a negative literal. Printing ([`Display`](fmt::Display)) is fully
//! parenthesized, so `parse(e.to_string()) == e` holds for every expression.
//!
//! ```
//! use its_rs::aexpr::AExpr;
//! use its_rs::types::Var;
//!
//! let e = AExpr::var(Var::new("x")) + AExpr::val(-1);
//! assert_eq!(e.to_string(), "(x + (-1))");
//! assert_eq!(AExpr::parse(&e.to_string()).unwrap(), e);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::iter::Peekable;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::{CharIndices, FromStr};

use thiserror::Error;

use crate::types::Var;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum AExpr {
    Val(i64),
    Var(Var),
    Neg(Box<AExpr>),
    Add(Box<AExpr>, Box<AExpr>),
    Sub(Box<AExpr>, Box<AExpr>),
    Mul(Box<AExpr>, Box<AExpr>),
}

impl AExpr {
    pub fn zero() -> Self {
        AExpr::Val(0)
    }

    pub fn one() -> Self {
        AExpr::Val(1)
    }

    pub fn val(value: i64) -> Self {
        AExpr::Val(value)
    }

    pub fn var(var: Var) -> Self {
        AExpr::Var(var)
    }

    pub fn neg(e: Self) -> Self {
        AExpr::Neg(Box::new(e))
    }

    pub fn add(lhs: Self, rhs: Self) -> Self {
        AExpr::Add(Box::new(lhs), Box::new(rhs))
    }

    pub fn sub(lhs: Self, rhs: Self) -> Self {
        AExpr::Sub(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(lhs: Self, rhs: Self) -> Self {
        AExpr::Mul(Box::new(lhs), Box::new(rhs))
    }
}

impl AExpr {
    /// Replaces every variable in the domain of `map` by its image.
    ///
    /// Substitution is simultaneous and total: unmapped variables are kept.
    pub fn substitute(&self, map: &HashMap<Var, AExpr>) -> AExpr {
        match self {
            AExpr::Val(v) => AExpr::Val(*v),
            AExpr::Var(v) => map.get(v).cloned().unwrap_or_else(|| AExpr::Var(v.clone())),
            AExpr::Neg(e) => AExpr::neg(e.substitute(map)),
            AExpr::Add(a, b) => AExpr::add(a.substitute(map), b.substitute(map)),
            AExpr::Sub(a, b) => AExpr::sub(a.substitute(map), b.substitute(map)),
            AExpr::Mul(a, b) => AExpr::mul(a.substitute(map), b.substitute(map)),
        }
    }

    pub fn has_var(&self, var: &Var) -> bool {
        match self {
            AExpr::Val(_) => false,
            AExpr::Var(v) => v == var,
            AExpr::Neg(e) => e.has_var(var),
            AExpr::Add(a, b) | AExpr::Sub(a, b) | AExpr::Mul(a, b) => a.has_var(var) || b.has_var(var),
        }
    }

    /// Adds all variables satisfying `pred` to `vars`.
    pub fn collect_vars<P>(&self, vars: &mut BTreeSet<Var>, pred: &P)
    where
        P: Fn(&Var) -> bool,
    {
        match self {
            AExpr::Val(_) => {}
            AExpr::Var(v) => {
                if pred(v) {
                    vars.insert(v.clone());
                }
            }
            AExpr::Neg(e) => e.collect_vars(vars, pred),
            AExpr::Add(a, b) | AExpr::Sub(a, b) | AExpr::Mul(a, b) => {
                a.collect_vars(vars, pred);
                b.collect_vars(vars, pred);
            }
        }
    }

    pub fn free_vars<P>(&self, pred: P) -> BTreeSet<Var>
    where
        P: Fn(&Var) -> bool,
    {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars, &pred);
        vars
    }

    /// Parses an expression, see the [module documentation](self) for the grammar.
    pub fn parse(input: &str) -> Result<AExpr, ParseError> {
        let mut parser = Parser::new(input)?;
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some((offset, tok)) => Err(parser.error(offset, format!("unexpected {}", tok))),
        }
    }
}

impl FromStr for AExpr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AExpr::parse(s)
    }
}

impl From<Var> for AExpr {
    fn from(var: Var) -> Self {
        AExpr::Var(var)
    }
}

impl From<i64> for AExpr {
    fn from(value: i64) -> Self {
        AExpr::Val(value)
    }
}

impl Add for AExpr {
    type Output = AExpr;

    fn add(self, rhs: Self) -> Self::Output {
        AExpr::add(self, rhs)
    }
}

impl Sub for AExpr {
    type Output = AExpr;

    fn sub(self, rhs: Self) -> Self::Output {
        AExpr::sub(self, rhs)
    }
}

impl Mul for AExpr {
    type Output = AExpr;

    fn mul(self, rhs: Self) -> Self::Output {
        AExpr::mul(self, rhs)
    }
}

impl Neg for AExpr {
    type Output = AExpr;

    fn neg(self) -> Self::Output {
        AExpr::neg(self)
    }
}

impl fmt::Display for AExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AExpr::Val(v) if *v < 0 => write!(f, "({})", v),
            AExpr::Val(v) => write!(f, "{}", v),
            AExpr::Var(v) => write!(f, "{}", v),
            AExpr::Neg(e) => write!(f, "(- {})", e),
            AExpr::Add(a, b) => write!(f, "({} + {})", a, b),
            AExpr::Sub(a, b) => write!(f, "({} - {})", a, b),
            AExpr::Mul(a, b) => write!(f, "({} * {})", a, b),
        }
    }
}

/// Malformed arithmetic expression text.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("cannot parse `{input}` at offset {offset}: {message}")]
pub struct ParseError {
    pub input: String,
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Token {
    Int(u64),
    Ident(String, bool),
    Plus,
    /// `glued` is set when the minus is immediately followed by a digit.
    Minus {
        glued: bool,
    },
    Star,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(v) => write!(f, "integer {}", v),
            Token::Ident(s, _) => write!(f, "identifier `{}`", s),
            Token::Plus => write!(f, "`+`"),
            Token::Minus { .. } => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '#')
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let error = |offset: usize, message: String| ParseError {
        input: input.to_string(),
        offset,
        message,
    };

    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push((offset, Token::Plus));
            }
            '-' => {
                chars.next();
                let glued = matches!(chars.peek(), Some((_, d)) if d.is_ascii_digit());
                tokens.push((offset, Token::Minus { glued }));
            }
            '*' => {
                chars.next();
                tokens.push((offset, Token::Star));
            }
            '(' => {
                chars.next();
                tokens.push((offset, Token::LParen));
            }
            ')' => {
                chars.next();
                tokens.push((offset, Token::RParen));
            }
            c if c.is_ascii_digit() => {
                let mut end = offset;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let digits = &input[offset..end];
                let value = digits
                    .parse::<u64>()
                    .map_err(|_| error(offset, format!("integer literal `{}` out of range", digits)))?;
                tokens.push((offset, Token::Int(value)));
            }
            c if is_ident_start(c) => {
                let mut end = offset;
                while let Some(&(i, d)) = chars.peek() {
                    if !is_ident_continue(d) {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let post = matches!(chars.peek(), Some((_, '\'')));
                if post {
                    chars.next();
                }
                tokens.push((offset, Token::Ident(input[offset..end].to_string(), post)));
            }
            other => return Err(error(offset, format!("unexpected character `{}`", other))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        Ok(Self {
            input,
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn error(&self, offset: usize, message: String) -> ParseError {
        ParseError {
            input: self.input.to_string(),
            offset,
            message,
        }
    }

    fn peek(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(offset, tok)| (*offset, tok))
    }

    fn bump(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn expr(&mut self) -> Result<AExpr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some((_, Token::Plus)) => {
                    self.bump();
                    lhs = AExpr::add(lhs, self.term()?);
                }
                Some((_, Token::Minus { .. })) => {
                    self.bump();
                    lhs = AExpr::sub(lhs, self.term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<AExpr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some((_, Token::Star)) = self.peek() {
            self.bump();
            lhs = AExpr::mul(lhs, self.unary()?);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<AExpr, ParseError> {
        match self.peek() {
            Some((offset, &Token::Minus { glued: true })) => {
                self.bump();
                match self.bump() {
                    Some((_, Token::Int(v))) => {
                        let value = i64::try_from(-(v as i128))
                            .map_err(|_| self.error(offset, format!("integer literal `-{}` out of range", v)))?;
                        Ok(AExpr::Val(value))
                    }
                    _ => Err(self.error(offset, "expected integer after `-`".to_string())),
                }
            }
            Some((_, Token::Minus { glued: false })) => {
                self.bump();
                Ok(AExpr::neg(self.unary()?))
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<AExpr, ParseError> {
        let end = self.input.len();
        match self.bump() {
            Some((offset, Token::Int(v))) => i64::try_from(v)
                .map(AExpr::Val)
                .map_err(|_| self.error(offset, format!("integer literal `{}` out of range", v))),
            Some((_, Token::Ident(symbol, post))) => Ok(AExpr::Var(if post {
                Var::post(symbol)
            } else {
                Var::new(symbol)
            })),
            Some((_, Token::LParen)) => {
                let e = self.expr()?;
                match self.bump() {
                    Some((_, Token::RParen)) => Ok(e),
                    Some((offset, tok)) => Err(self.error(offset, format!("expected `)`, found {}", tok))),
                    None => Err(self.error(end, "expected `)`, found end of input".to_string())),
                }
            }
            Some((offset, tok)) => Err(self.error(offset, format!("expected operand, found {}", tok))),
            None => Err(self.error(end, "expected operand, found end of input".to_string())),
        }
    }
}
